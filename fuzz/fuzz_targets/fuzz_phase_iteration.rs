#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use roadnet::config::{Backend, ConfigLoader};
use roadnet::network::RoadGeometryInfo;
use roadnet::network::builder::build_road_network;
use roadnet::phase::{DynamicEnvironmentHandler, FixedPhaseIterationHandler, ManualTimer};

const RULES: &str = r"
PhaseRings:
  - ID: Ring
    Phases:
      - ID: Green
      - ID: Yellow
      - ID: Red
    PhaseTransitionGraph:
      Green:
        - ID: Yellow
      Yellow:
        - ID: Red
      Red:
        - ID: Green
  - ID: Static
    Phases:
      - ID: Only
";

// First byte picks the phase duration, every following byte is a clock
// step in hundredths of a second.
fuzz_target!(|data: &[u8]| {
    let Some((&duration, steps)) = data.split_first() else {
        return;
    };
    let phase_duration = f64::from(duration.max(1)) / 100.0;

    let loaded = ConfigLoader::with_defaults()
        .load_from_str(RULES, "<fuzz>")
        .expect("fixed rules load");
    let geometry = RoadGeometryInfo {
        id: "fuzz".to_string(),
        backend: Backend::Dragway,
        configuration: BTreeMap::new(),
    };
    let network = build_road_network(geometry, &loaded.document).expect("fixed rules build");
    let timer = ManualTimer::new();
    let mut handler = FixedPhaseIterationHandler::new(&timer, &network, phase_duration)
        .expect("positive duration");

    for &step in steps {
        timer.advance(f64::from(step) / 100.0);
        handler.update().expect("consistent network never fails");
        assert!(network.check_invariants().is_empty());
    }
});
