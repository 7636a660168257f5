//! # Labeler Diagnostics Test Suite
//!
//! End-to-end flows that drive the real XRPC adapters against a loopback
//! labeler.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Keys, signed labels, frames, loopback labeler
//! │
//! └── integration/
//!     ├── query_flows.rs        # queryLabels over HTTP
//!     ├── subscribe_flows.rs    # subscribeLabels over WebSocket
//!     └── diagnostics_flows.rs  # Orchestrator, policy lookup, report
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p labeler-tests
//!
//! # By transport
//! cargo test -p labeler-tests integration::query_flows::
//! cargo test -p labeler-tests integration::subscribe_flows::
//! ```

pub mod fixtures;
pub mod integration;
