//! # Integration Tests
//!
//! Each flow spawns its own loopback labeler on an ephemeral port.

#[cfg(test)]
mod query_flows;
