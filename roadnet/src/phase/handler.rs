//! Dynamic environment handlers.
//!
//! A handler mutates the dynamic state of a road network (its phase
//! rings) each time its owner calls [`DynamicEnvironmentHandler::update`].
//! Strategies are selected by [`DynamicEnvironmentHandlerType`].

use std::fmt;
use std::str::FromStr;

use crate::config::suggest;
use crate::error::PhaseError;
use crate::network::RoadNetwork;

use super::fixed::FixedPhaseIterationHandler;
use super::timer::Timer;

/// Periodically updates the dynamic state of a road network.
pub trait DynamicEnvironmentHandler: Send {
    /// Advances the dynamic state if the strategy says it is time to.
    ///
    /// May be called at any cadence; calling it more often than needed
    /// never produces extra transitions.
    ///
    /// # Errors
    ///
    /// Returns an error when the road network's phase state is
    /// inconsistent with its phase ring book.
    fn update(&mut self) -> Result<(), PhaseError>;
}

/// Available handler strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DynamicEnvironmentHandlerType {
    /// Advances every phase ring one step each time a fixed duration
    /// elapses.
    #[default]
    #[value(name = "fixed-phase-iteration")]
    FixedPhaseIteration,
}

impl DynamicEnvironmentHandlerType {
    /// Every strategy, for lookup and suggestions.
    pub const ALL: [Self; 1] = [Self::FixedPhaseIteration];

    /// Returns the strategy identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedPhaseIteration => "fixed-phase-iteration",
        }
    }
}

impl fmt::Display for DynamicEnvironmentHandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DynamicEnvironmentHandlerType {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let hint = suggest(s, Self::ALL.iter().map(|k| k.as_str()))
                    .map_or_else(String::new, |h| format!("; did you mean '{h}'?"));
                PhaseError::InvalidArgument(format!("unknown handler type '{s}'{hint}"))
            })
    }
}

/// Creates a handler of the given strategy.
///
/// The handler borrows `timer` and `network` for its whole lifetime.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidArgument`] if `phase_duration` is not a
/// positive finite number of seconds.
pub fn create_dynamic_environment_handler<'a>(
    kind: DynamicEnvironmentHandlerType,
    timer: &'a dyn Timer,
    network: &'a RoadNetwork,
    phase_duration: f64,
) -> Result<Box<dyn DynamicEnvironmentHandler + 'a>, PhaseError> {
    tracing::debug!(handler = %kind, phase_duration, "creating dynamic environment handler");
    match kind {
        DynamicEnvironmentHandlerType::FixedPhaseIteration => Ok(Box::new(
            FixedPhaseIterationHandler::new(timer, network, phase_duration)?,
        )),
    }
}
