//! # Domain Layer
//!
//! Pure label, signature and accumulation logic with no I/O.
//! This is the inner layer of the hexagonal architecture.

pub mod abort;
pub mod assessment;
pub mod config;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod flags;
pub mod label;
pub mod signable;
pub mod signature;
