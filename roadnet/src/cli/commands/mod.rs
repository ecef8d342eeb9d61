//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod dynamic_environment;
pub mod measure_load_time;
pub mod report;
pub mod to_string;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{BackendArgs, Cli, Commands};
use crate::error::RoadnetError;
use crate::network::{RoadNetwork, load_road_network};

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` is triggered on Ctrl+C; long-running commands stop early when
/// it fires.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), RoadnetError> {
    match cli.command {
        Commands::DynamicEnvironment(args) => dynamic_environment::run(&args, cancel).await,
        Commands::MeasureLoadTime(args) => measure_load_time::run(&args),
        Commands::ToString(args) => to_string::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the road network selected by the backend flags.
///
/// # Errors
///
/// Returns a config error for invalid build properties or rules files.
pub fn load_network(args: &BackendArgs) -> Result<RoadNetwork, RoadnetError> {
    tracing::info!(backend = %args.backend, "loading road network");
    load_road_network(
        args.backend,
        &args.dragway(),
        &args.multilane(),
        &args.malidrive(),
        &args.osm(),
    )
}
