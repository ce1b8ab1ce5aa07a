//! Logging utilities.
//!
//! The crate itself only talks to the `log` facade. This module offers an
//! `env_logger` setup for binaries and tests that do not bring their own.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
