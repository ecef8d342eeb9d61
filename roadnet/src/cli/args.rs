//! CLI argument definitions
//!
//! All Clap derive structs for `roadnet` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    Backend, BuildPolicy, DragwayBuildProperties, MalidriveBuildProperties, MapOrigin,
    MultilaneBuildProperties, OsmBuildProperties, SimplificationPolicy, StandardStrictnessPolicy,
};
use crate::observability::{LogFormat, LogSettings};
use crate::phase::DynamicEnvironmentHandlerType;

// ============================================================================
// Root CLI
// ============================================================================

/// Load road networks and iterate their traffic-signal phases.
#[derive(Parser, Debug)]
#[command(name = "roadnet", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "ROADNET_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "ROADNET_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Logging configuration requested by the global flags.
    #[must_use]
    pub const fn log_settings(&self) -> LogSettings {
        LogSettings {
            format: self.log_format,
            verbosity: self.verbose,
            quiet: self.quiet,
            color: self.color,
        }
    }
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a road network and step its phase rings over time.
    DynamicEnvironment(DynamicEnvironmentArgs),

    /// Load a road network repeatedly and report the mean load time.
    MeasureLoadTime(MeasureLoadTimeArgs),

    /// Load a road network and print a summary of it.
    #[command(name = "to-string")]
    ToString(ToStringArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version and build information.
    Version(VersionArgs),
}

// ============================================================================
// Backend Selection
// ============================================================================

/// Road network backend and its build properties.
///
/// Flattened into every command that loads a network. Flags belonging to a
/// backend other than the selected one are ignored.
#[derive(Args, Debug, Clone)]
pub struct BackendArgs {
    /// Backend used to build the road network.
    #[arg(long, default_value = "dragway", env = "ROADNET_BACKEND")]
    pub backend: Backend,

    // ---- dragway ----
    /// Number of lanes (dragway).
    #[arg(long, default_value_t = 2, help_heading = "Dragway")]
    pub num_lanes: u32,

    /// Length of the lanes in meters (dragway).
    #[arg(long, default_value_t = 10.0, help_heading = "Dragway")]
    pub length: f64,

    /// Width of each lane in meters (dragway).
    #[arg(long, default_value_t = 3.7, help_heading = "Dragway")]
    pub lane_width: f64,

    /// Width of the shoulders in meters (dragway).
    #[arg(long, default_value_t = 3.0, help_heading = "Dragway")]
    pub shoulder_width: f64,

    /// Maximum modelled height above the road in meters (dragway).
    #[arg(long, default_value_t = 5.2, help_heading = "Dragway")]
    pub maximum_height: f64,

    // ---- multilane ----
    /// YAML file describing the road network (multilane).
    #[arg(long, help_heading = "Multilane")]
    pub yaml_file: Option<PathBuf>,

    // ---- malidrive ----
    /// OpenDRIVE file (malidrive).
    #[arg(long, help_heading = "Malidrive")]
    pub xodr_file_path: Option<PathBuf>,

    /// Linear tolerance used to load the map (malidrive, osm; osm uses 0.05 when unset).
    #[arg(long, help_heading = "Malidrive")]
    pub linear_tolerance: Option<f64>,

    /// Maximum linear tolerance used to load the map (malidrive).
    #[arg(long, help_heading = "Malidrive")]
    pub max_linear_tolerance: Option<f64>,

    /// Geometry build policy (malidrive).
    #[arg(long, default_value = "sequential", help_heading = "Malidrive")]
    pub build_policy: BuildPolicy,

    /// Number of builder threads, 0 lets the builder decide (malidrive).
    #[arg(long, default_value_t = 0, help_heading = "Malidrive")]
    pub number_of_threads: u32,

    /// Geometry simplification policy (malidrive).
    #[arg(long, default_value = "none", help_heading = "Malidrive")]
    pub simplification_policy: SimplificationPolicy,

    /// OpenDRIVE strictness, e.g. "strict" or "allow_schema_errors|allow_semantic_errors" (malidrive).
    #[arg(long, default_value = "permissive", help_heading = "Malidrive")]
    pub standard_strictness_policy: StandardStrictnessPolicy,

    /// Omit non-drivable lanes (malidrive).
    #[arg(long, help_heading = "Malidrive")]
    pub omit_nondrivable_lanes: bool,

    /// Rules document with the road rule book (malidrive, osm).
    #[arg(long, help_heading = "Malidrive")]
    pub road_rule_book_file: Option<PathBuf>,

    /// Rules document with the phase ring book (malidrive, osm).
    #[arg(long, help_heading = "Malidrive")]
    pub phase_ring_book_file: Option<PathBuf>,

    /// Rules document with the intersection book (malidrive, osm).
    #[arg(long, help_heading = "Malidrive")]
    pub intersection_book_file: Option<PathBuf>,

    // ---- osm ----
    /// OpenStreetMap file (osm).
    #[arg(long, help_heading = "Osm")]
    pub osm_file: Option<PathBuf>,

    /// Angular tolerance used to load the map (osm).
    #[arg(long, default_value_t = 1e-3, help_heading = "Osm")]
    pub angular_tolerance: f64,

    /// Map origin as "{lat, lon}" (osm).
    #[arg(long, default_value = "{0., 0.}", help_heading = "Osm")]
    pub origin: MapOrigin,
}

impl BackendArgs {
    /// Dragway build properties from the flags.
    #[must_use]
    pub const fn dragway(&self) -> DragwayBuildProperties {
        DragwayBuildProperties {
            num_lanes: self.num_lanes,
            length: self.length,
            lane_width: self.lane_width,
            shoulder_width: self.shoulder_width,
            maximum_height: self.maximum_height,
        }
    }

    /// Multilane build properties from the flags.
    #[must_use]
    pub fn multilane(&self) -> MultilaneBuildProperties {
        MultilaneBuildProperties {
            yaml_file: self.yaml_file.clone().unwrap_or_default(),
        }
    }

    /// Malidrive build properties from the flags.
    #[must_use]
    pub fn malidrive(&self) -> MalidriveBuildProperties {
        MalidriveBuildProperties {
            xodr_file_path: self.xodr_file_path.clone().unwrap_or_default(),
            linear_tolerance: self.linear_tolerance,
            max_linear_tolerance: self.max_linear_tolerance,
            build_policy: self.build_policy,
            number_of_threads: self.number_of_threads,
            simplification_policy: self.simplification_policy,
            standard_strictness_policy: self.standard_strictness_policy,
            omit_nondrivable_lanes: self.omit_nondrivable_lanes,
            road_rule_book_file: self.road_rule_book_file.clone(),
            phase_ring_book_file: self.phase_ring_book_file.clone(),
            intersection_book_file: self.intersection_book_file.clone(),
        }
    }

    /// OSM build properties from the flags.
    #[must_use]
    pub fn osm(&self) -> OsmBuildProperties {
        let defaults = OsmBuildProperties::default();
        OsmBuildProperties {
            osm_file: self.osm_file.clone().unwrap_or_default(),
            linear_tolerance: self.linear_tolerance.unwrap_or(defaults.linear_tolerance),
            angular_tolerance: self.angular_tolerance,
            origin: self.origin,
            road_rule_book_file: self.road_rule_book_file.clone(),
            phase_ring_book_file: self.phase_ring_book_file.clone(),
            intersection_book_file: self.intersection_book_file.clone(),
        }
    }
}

// ============================================================================
// Network Commands
// ============================================================================

/// Arguments for `dynamic-environment`.
#[derive(Args, Debug)]
pub struct DynamicEnvironmentArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Handler strategy driving the phase rings.
    #[arg(long, default_value = "fixed-phase-iteration")]
    pub handler: DynamicEnvironmentHandlerType,

    /// Seconds each phase lasts.
    #[arg(long, default_value_t = 2.0)]
    pub phase_duration: f64,

    /// Seconds to run before exiting.
    #[arg(long, default_value_t = 20.0)]
    pub timeout: f64,

    /// Delay between handler updates (e.g. "250ms", "1s").
    #[arg(long, default_value = "250ms", value_parser = humantime::parse_duration)]
    pub poll_interval: Duration,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `measure-load-time`.
#[derive(Args, Debug)]
pub struct MeasureLoadTimeArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Number of times the network is loaded.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub iterations: u32,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `to-string`.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct ToStringArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Prefix each section with its type label.
    #[arg(long)]
    pub include_type_labels: bool,

    /// Include the road geometry id and build configuration.
    #[arg(long)]
    pub include_road_geometry_id: bool,

    /// Include the discrete and range value rules.
    #[arg(long)]
    pub include_rules: bool,

    /// Include the phase rings with their current state.
    #[arg(long)]
    pub include_phase_rings: bool,

    /// Include the intersections.
    #[arg(long)]
    pub include_intersections: bool,

    /// Check that the phase state is consistent with the phase rings.
    #[arg(long)]
    pub check_invariants: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
