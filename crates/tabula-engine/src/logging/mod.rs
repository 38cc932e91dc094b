//! Logging utilities.
//!
//! The engine reports through the `log` facade only. `init_logging` is a
//! convenience for hosts and tests that want `env_logger` output.

mod init;

pub use init::{init_logging, LoggingConfig};
