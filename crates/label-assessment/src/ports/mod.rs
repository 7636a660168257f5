//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the orchestrator uses
//! - **Outbound (Driven)**: Transports this engine needs

pub mod inbound;
pub mod outbound;
