#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use roadnet::config::{Backend, ConfigLoader};
use roadnet::network::RoadGeometryInfo;
use roadnet::network::builder::build_road_network;

fuzz_target!(|data: &[u8]| {
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(loaded) = ConfigLoader::with_defaults().load_from_str(yaml, "<fuzz>") else {
        return;
    };

    // A document that passed validation must build.
    let geometry = RoadGeometryInfo {
        id: "fuzz".to_string(),
        backend: Backend::Dragway,
        configuration: BTreeMap::new(),
    };
    let network = build_road_network(geometry, &loaded.document)
        .expect("validated document failed to build");
    assert!(network.check_invariants().is_empty());
});
