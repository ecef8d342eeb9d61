//! Error types for `roadnet`
//!
//! This module provides the error hierarchy for road-network loading,
//! phase iteration and the command-line tools, together with the exit
//! code each error maps to.

use thiserror::Error;

pub use roadnet_core::error::{ConfigError, Severity, ValidationIssue};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `roadnet` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure, bad backend properties)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Phase iteration error (untracked ring, invalid handler argument)
    pub const PHASE_ERROR: i32 = 5;

    /// Road network consistency error
    pub const NETWORK_ERROR: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `roadnet` operations.
///
/// This enum aggregates all domain-specific errors and provides
/// a unified interface for error handling and exit code mapping.
#[derive(Debug, Error)]
pub enum RoadnetError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Road network error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Phase iteration error
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RoadnetError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Network(_) => ExitCode::NETWORK_ERROR,
            Self::Phase(_) => ExitCode::PHASE_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Road Network Errors
// ============================================================================

/// Errors raised by the road-network model: phase rings, the phase
/// provider and intersections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Phase ring is not part of the phase ring book
    #[error("phase ring not found: {0}")]
    UnknownPhaseRing(String),

    /// Phase is not part of the given ring
    #[error("phase '{phase}' not found in phase ring '{ring}'")]
    UnknownPhase {
        /// Ring that was searched
        ring: String,
        /// Phase that was requested
        phase: String,
    },

    /// Phase ring construction was rejected
    #[error("invalid phase ring '{ring}': {reason}")]
    InvalidPhaseRing {
        /// Ring being built
        ring: String,
        /// What was wrong with it
        reason: String,
    },

    /// Phase ring is already tracked by the phase provider or book
    #[error("phase ring already registered: {0}")]
    DuplicatePhaseRing(String),

    /// Phase ring is not tracked by the phase provider
    #[error("phase ring is not tracked by the phase provider: {0}")]
    UntrackedPhaseRing(String),

    /// A transition duration was given without a next phase
    #[error("phase ring '{0}': duration_until requires a next phase")]
    DurationWithoutNextPhase(String),

    /// Intersection is not part of the intersection book
    #[error("intersection not found: {0}")]
    UnknownIntersection(String),

    /// Intersection id is declared more than once
    #[error("intersection already registered: {0}")]
    DuplicateIntersection(String),
}

// ============================================================================
// Phase Iteration Errors
// ============================================================================

/// Errors raised by dynamic environment handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhaseError {
    /// Handler was constructed with an unusable argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A ring in the phase ring book has no state in the phase provider.
    ///
    /// The ring book and the phase provider are populated together when
    /// the road network is loaded, so this means the network was only
    /// partially initialized.
    #[error("phase ring '{0}' is known to the phase ring book but not to the phase provider")]
    UntrackedPhaseRing(String),

    /// Underlying road-network operation failed
    #[error(transparent)]
    Network(#[from] NetworkError),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `roadnet` operations.
pub type Result<T> = std::result::Result<T, RoadnetError>;

// ============================================================================
// Tests
// ============================================================================
