//! Version information display.

use serde::Serialize;

use crate::cli::args::{OutputFormat, VersionArgs};

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    handlers: Vec<&'static str>,
}

fn info() -> VersionInfo {
    VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        handlers: crate::phase::DynamicEnvironmentHandlerType::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect(),
    }
}

/// Print version and build information.
pub fn run(args: &VersionArgs) {
    let info = info();
    match args.format {
        OutputFormat::Human => {
            println!("{} {}", info.name, info.version);
            println!("handlers: {}", info.handlers.join(", "));
        }
        OutputFormat::Json => match serde_json::to_string(&info) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "failed to serialize version info"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_json() {
        let value = serde_json::to_value(info()).unwrap();
        assert_eq!(value["name"], "roadnet");
        assert_eq!(value["handlers"][0], "fixed-phase-iteration");
    }
}
