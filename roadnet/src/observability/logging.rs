//! Tracing subscriber initialization.
//!
//! Logs go to stderr so that command output on stdout stays parseable.
//! `ROADNET_LOG_LEVEL` takes any `EnvFilter` directive and overrides the
//! verbosity flags.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable overriding the computed filter.
pub const LOG_LEVEL_ENV: &str = "ROADNET_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Everything [`init_logging`] needs from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings {
    pub format: LogFormat,
    pub verbosity: u8,
    pub quiet: bool,
    pub color: ColorChoice,
}

impl LogSettings {
    /// Returns the default filter directive for these settings.
    #[must_use]
    pub const fn directive(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            verbosity_to_directive(self.verbosity)
        }
    }

    fn use_ansi(&self) -> bool {
        match self.color {
            ColorChoice::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Maps `-v` occurrences to a filter directive.
///
/// 0 is `warn`, 1 `info`, 2 `debug`, anything above `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber.
///
/// A second call is a no-op.
pub fn init_logging(settings: LogSettings) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(settings.directive()));
    let show_target = settings.verbosity >= 2;

    match settings.format {
        LogFormat::Human => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(settings.use_ansi())
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
