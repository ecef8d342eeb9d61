//! `measure-load-time` command.

use std::time::Instant;

use serde::Serialize;

use crate::cli::args::{BackendArgs, MeasureLoadTimeArgs, OutputFormat};
use crate::error::RoadnetError;

use super::load_network;

/// Upper bound on the samples reserved up front.
const MAX_RESERVED_SAMPLES: usize = 1024;

/// Load time statistics, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadTimeReport {
    pub backend: String,
    pub iterations: u32,
    pub mean_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl LoadTimeReport {
    /// Summarizes per-iteration load times. `None` for an empty slice.
    #[must_use]
    pub fn from_samples(backend: String, samples: &[f64]) -> Option<Self> {
        let iterations = u32::try_from(samples.len()).ok().filter(|&n| n > 0)?;
        let total: f64 = samples.iter().sum();
        Some(Self {
            backend,
            iterations,
            mean_seconds: total / f64::from(iterations),
            min_seconds: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max_seconds: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Run the `measure-load-time` command.
///
/// # Errors
///
/// Returns a usage error when `--iterations` is zero, or the first load
/// failure.
pub fn run(args: &MeasureLoadTimeArgs) -> Result<(), RoadnetError> {
    let report = measure(&args.backend, args.iterations)?;
    match args.format {
        OutputFormat::Human => println!(
            "Mean time was: {}s out of {} iterations.",
            report.mean_seconds, report.iterations
        ),
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
    }
    Ok(())
}

/// Loads the network `iterations` times and summarizes the timings.
///
/// # Errors
///
/// Returns a usage error when `iterations` is zero, or the first load
/// failure.
pub fn measure(backend: &BackendArgs, iterations: u32) -> Result<LoadTimeReport, RoadnetError> {
    if iterations == 0 {
        return Err(RoadnetError::Usage(
            "the number of iterations must be greater than zero".to_string(),
        ));
    }

    let mut samples = Vec::with_capacity(sample_capacity(iterations));
    for i in 1..=iterations {
        tracing::info!(iteration = i, of = iterations, "building road network");
        let start = Instant::now();
        let network = load_network(backend)?;
        samples.push(start.elapsed().as_secs_f64());
        drop(network);
    }

    LoadTimeReport::from_samples(backend.backend.to_string(), &samples)
        .ok_or_else(|| RoadnetError::Usage("no load time samples".to_string()))
}

fn sample_capacity(iterations: u32) -> usize {
    usize::try_from(iterations).map_or(MAX_RESERVED_SAMPLES, |n| n.min(MAX_RESERVED_SAMPLES))
}
