//! Support library for the hypeq CLI binary.
//!
//! Exposes the command pipeline and logging setup so tests can drive them
//! without forking a subprocess.

pub mod cli;
pub mod logging;
