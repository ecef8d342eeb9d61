//! Fixed-duration phase iteration.
//!
//! Every time more than `phase_duration` seconds have passed since the
//! last transition, each phase ring moves to the next phase recorded by
//! the phase provider. The gate is global: the per-ring `duration_until`
//! values are carried along in the phase state but never consulted.

use tracing::{debug, trace};

use crate::error::{NetworkError, PhaseError};
use crate::network::RoadNetwork;

use super::handler::DynamicEnvironmentHandler;
use super::timer::Timer;

/// Advances every phase ring one step per elapsed `phase_duration`.
pub struct FixedPhaseIterationHandler<'a> {
    timer: &'a dyn Timer,
    network: &'a RoadNetwork,
    phase_duration: f64,
    last_elapsed_time: f64,
}

impl<'a> FixedPhaseIterationHandler<'a> {
    /// Creates a handler.
    ///
    /// The first transition happens once the timer reads more than
    /// `phase_duration`.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::InvalidArgument`] if `phase_duration` is not a
    /// positive finite number of seconds.
    pub fn new(
        timer: &'a dyn Timer,
        network: &'a RoadNetwork,
        phase_duration: f64,
    ) -> Result<Self, PhaseError> {
        if !(phase_duration.is_finite() && phase_duration > 0.0) {
            return Err(PhaseError::InvalidArgument(format!(
                "phase_duration must be a positive number of seconds, got {phase_duration}"
            )));
        }
        Ok(Self {
            timer,
            network,
            phase_duration,
            last_elapsed_time: 0.0,
        })
    }

    /// Returns the configured phase duration in seconds.
    #[must_use]
    pub const fn phase_duration(&self) -> f64 {
        self.phase_duration
    }

    /// Returns the timer reading at the last transition.
    #[must_use]
    pub const fn last_elapsed_time(&self) -> f64 {
        self.last_elapsed_time
    }
}

impl DynamicEnvironmentHandler for FixedPhaseIterationHandler<'_> {
    fn update(&mut self) -> Result<(), PhaseError> {
        let elapsed = self.timer.elapsed();
        // A NaN reading compares false and never triggers a transition.
        let due = elapsed - self.last_elapsed_time > self.phase_duration;
        if !due {
            return Ok(());
        }
        self.last_elapsed_time = elapsed;

        let book = self.network.phase_ring_book();
        let reader = self.network.phase_provider();
        let writer = self.network.phase_state_writer();

        for ring_id in book.phase_rings() {
            let ring = book
                .phase_ring(&ring_id)
                .ok_or_else(|| NetworkError::UnknownPhaseRing(ring_id.to_string()))?;
            let current = reader
                .phase(&ring_id)
                .ok_or_else(|| PhaseError::UntrackedPhaseRing(ring_id.to_string()))?;

            let Some(next) = current.next else {
                trace!(ring = %ring_id, phase = %current.state, "static phase ring, skipping");
                continue;
            };

            let new_phase = next.state;
            let following = ring.next_phases(&new_phase)?.first();
            writer.set_phase(
                &ring_id,
                new_phase.clone(),
                following.map(|n| n.id.clone()),
                following.and_then(|n| n.duration_until),
            )?;

            debug!(
                ring = %ring_id,
                from = %current.state,
                to = %new_phase,
                elapsed,
                "phase ring advanced"
            );
        }

        Ok(())
    }
}

impl std::fmt::Debug for FixedPhaseIterationHandler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedPhaseIterationHandler")
            .field("phase_duration", &self.phase_duration)
            .field("last_elapsed_time", &self.last_elapsed_time)
            .finish_non_exhaustive()
    }
}
