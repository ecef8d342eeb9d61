//! Rules configuration.
//!
//! Loading and validation of the rules YAML documents that describe a road
//! network's rule book, phase rings and intersections.

pub mod loader;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, RuleSources};
pub use roadnet_core::config::*;
pub use validation::{ValidationResult, Validator};
