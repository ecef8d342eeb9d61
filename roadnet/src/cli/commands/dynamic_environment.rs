//! `dynamic-environment` command.
//!
//! Loads a road network, prints its static rules, then repeatedly sleeps
//! for the poll interval, updates the handler and prints the current phase
//! of every ring until the timeout elapses or the command is cancelled.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{DynamicEnvironmentArgs, OutputFormat};
use crate::error::RoadnetError;
use crate::network::RoadNetwork;
use crate::phase::{
    ChronoTimer, DynamicEnvironmentHandler, Timer, create_dynamic_environment_handler,
};

use super::load_network;
use super::report::{RingReport, StaticRules, ring_reports};

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The timer passed the timeout.
    Timeout,
    /// The cancellation token fired.
    Cancelled,
}

/// Loop parameters.
#[derive(Debug, Clone, Copy)]
pub struct DriveOptions {
    pub timeout: f64,
    pub poll_interval: Duration,
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct Tick<'a> {
    time: f64,
    phase_rings: Vec<RingReport<'a>>,
}

/// Run the `dynamic-environment` command.
///
/// # Errors
///
/// Returns a usage error for a negative or NaN timeout, a config error
/// when the network fails to load, and a phase error when the handler
/// cannot be built or fails to update.
pub async fn run(args: &DynamicEnvironmentArgs, cancel: CancellationToken) -> Result<(), RoadnetError> {
    if args.timeout.is_nan() || args.timeout < 0.0 {
        return Err(RoadnetError::Usage(format!(
            "--timeout must be a non-negative number of seconds, got {}",
            args.timeout
        )));
    }

    let network = load_network(&args.backend)?;
    let timer = ChronoTimer::new();
    let mut handler =
        create_dynamic_environment_handler(args.handler, &timer, &network, args.phase_duration)?;

    let options = DriveOptions {
        timeout: args.timeout,
        poll_interval: args.poll_interval,
        format: args.format,
    };
    let mut stdout = std::io::stdout().lock();
    let reason = drive(&network, &timer, handler.as_mut(), options, &mut stdout, &cancel).await?;

    tracing::info!(?reason, elapsed = timer.elapsed(), "dynamic environment stopped");
    Ok(())
}

/// Prints the static rules, then drives `handler` until `timer` passes
/// `options.timeout` or `cancel` fires.
///
/// # Errors
///
/// Returns the first handler failure, or an I/O error when writing fails.
pub async fn drive(
    network: &RoadNetwork,
    timer: &dyn Timer,
    handler: &mut dyn DynamicEnvironmentHandler,
    options: DriveOptions,
    out: &mut impl Write,
    cancel: &CancellationToken,
) -> Result<StopReason, RoadnetError> {
    let static_rules = StaticRules::collect(network.rulebook());
    match options.format {
        OutputFormat::Human => static_rules.write_human(out)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &static_rules)?;
            writeln!(out)?;
        }
    }

    while timer.elapsed() <= options.timeout {
        tokio::select! {
            () = cancel.cancelled() => return Ok(StopReason::Cancelled),
            () = tokio::time::sleep(options.poll_interval) => {}
        }

        let time = timer.elapsed();
        handler.update()?;
        let phase_rings = ring_reports(network)?;

        match options.format {
            OutputFormat::Human => {
                writeln!(out, "Time: {time}")?;
                for ring in &phase_rings {
                    ring.write_human(out)?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &Tick { time, phase_rings })?;
                writeln!(out)?;
            }
        }
        out.flush()?;
    }

    Ok(StopReason::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, ConfigLoader};
    use crate::network::RoadGeometryInfo;
    use crate::network::builder::build_road_network;
    use crate::phase::FixedPhaseIterationHandler;
    use std::collections::BTreeMap;

    const RULES: &str = r"
DiscreteValueRules:
  - ID: CrosswalkRightOfWay
    Values: [Go, Stop]
PhaseRings:
  - ID: CrosswalkRing
    Phases:
      - ID: AllGoPhase
        DiscreteValueRuleStates:
          CrosswalkRightOfWay: Go
      - ID: AllStopPhase
        DiscreteValueRuleStates:
          CrosswalkRightOfWay: Stop
    PhaseTransitionGraph:
      AllGoPhase:
        - ID: AllStopPhase
      AllStopPhase:
        - ID: AllGoPhase
";

    fn network() -> RoadNetwork {
        let loaded = ConfigLoader::default().load_from_str(RULES, "<rules>").unwrap();
        build_road_network(
            RoadGeometryInfo {
                id: "crosswalk".to_string(),
                backend: Backend::Dragway,
                configuration: BTreeMap::new(),
            },
            &loaded.document,
        )
        .unwrap()
    }

    fn phases_in(text: &str) -> Vec<&str> {
        text.lines()
            .filter_map(|line| line.split("Current Phase: ").nth(1))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_until_timeout() {
        let network = network();
        let timer = ChronoTimer::new();
        let mut handler = FixedPhaseIterationHandler::new(&timer, &network, 0.5).unwrap();
        let options = DriveOptions {
            timeout: 1.35,
            poll_interval: Duration::from_millis(300),
            format: OutputFormat::Human,
        };

        let mut out = Vec::new();
        let reason = drive(
            &network,
            &timer,
            &mut handler,
            options,
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(reason, StopReason::Timeout);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Static DiscreteValueRules\nStatic RangeValueRules\n"));
        // Ticks at 0.3, 0.6, 0.9, 1.2 and 1.5; transitions at 0.6 and 1.2.
        assert_eq!(
            phases_in(&text),
            [
                "AllGoPhase",
                "AllStopPhase",
                "AllStopPhase",
                "AllGoPhase",
                "AllGoPhase"
            ]
        );
        assert!(text.contains("\tDiscrete Value Rule: CrosswalkRightOfWay | State: Stop\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_json_lines() {
        let network = network();
        let timer = ChronoTimer::new();
        let mut handler = FixedPhaseIterationHandler::new(&timer, &network, 0.5).unwrap();
        let options = DriveOptions {
            timeout: 0.5,
            poll_interval: Duration::from_millis(550),
            format: OutputFormat::Json,
        };

        let mut out = Vec::new();
        drive(
            &network,
            &timer,
            &mut handler,
            options,
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0]["discrete_value_rules"].as_array().unwrap().is_empty());
        assert_eq!(lines[1]["phase_rings"][0]["phase"], "AllStopPhase");
        assert!(lines[1]["time"].as_f64().unwrap() >= 0.55);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_stops_on_cancel() {
        let network = network();
        let timer = ChronoTimer::new();
        let mut handler = FixedPhaseIterationHandler::new(&timer, &network, 0.5).unwrap();
        let options = DriveOptions {
            timeout: 3600.0,
            poll_interval: Duration::from_millis(250),
            format: OutputFormat::Human,
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            trigger.cancel();
        });

        let mut out = Vec::new();
        let reason = drive(&network, &timer, &mut handler, options, &mut out, &cancel)
            .await
            .unwrap();
        assert_eq!(reason, StopReason::Cancelled);
        assert!(timer.elapsed() < 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_prints_one_tick() {
        let network = network();
        let timer = ChronoTimer::new();
        let mut handler = FixedPhaseIterationHandler::new(&timer, &network, 1.0).unwrap();
        let options = DriveOptions {
            timeout: 0.0,
            poll_interval: Duration::from_millis(250),
            format: OutputFormat::Human,
        };

        let mut out = Vec::new();
        drive(
            &network,
            &timer,
            &mut handler,
            options,
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Time: ").count(), 1);
    }
}
