//! Logging setup for the `roadnet` binaries.

pub mod logging;

pub use logging::{LogFormat, LogSettings, init_logging, verbosity_to_directive};
