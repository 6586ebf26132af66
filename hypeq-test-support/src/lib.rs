//! Shared test utilities used across hypeq crates.

pub mod ci;
pub mod tracing;
