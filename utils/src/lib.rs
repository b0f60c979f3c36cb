//! Shared utilities for rngate binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
