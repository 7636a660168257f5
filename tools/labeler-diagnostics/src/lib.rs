//! # Labeler Diagnostics
//!
//! Command-line front end for the label assessment engine. Tests one labeler
//! endpoint over `queryLabels` and `subscribeLabels` and reports what it
//! found.
//!
//! ## Flow
//!
//! 1. Parse flags ([`cli`]) over environment defaults ([`config`])
//! 2. Look up the labeler's declared policies when only a DID is known ([`policies`])
//! 3. Run both transports concurrently under a deadline ([`orchestrator`])
//! 4. Print one report per transport ([`render`])

pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod policies;
pub mod render;

pub use cli::Args;
pub use config::DiagnosticsConfig;
pub use orchestrator::{DiagnosticsReport, RunPlan, TransportReport};
pub use policies::{PolicyClient, PolicyError};
