#![no_main]
use kiln_config::{parse_profile_json, parse_profile_toml};
use kiln_core::{DEFAULT_AMBIENT_C, Profile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let docs = [parse_profile_json(data).ok(), parse_profile_toml(data).ok()];
    for doc in docs.into_iter().flatten() {
        let Ok(profile) = Profile::try_from(&doc) else {
            continue;
        };
        // Every accepted profile can be walked end to end.
        for (i, phase) in profile.phases().iter().enumerate() {
            let d = phase.duration_s() as f64;
            for elapsed in [0.0, d / 2.0, d] {
                assert!(profile.setpoint_at(i, elapsed, DEFAULT_AMBIENT_C).is_some());
            }
        }
        let _ = profile.total_duration_s();
    }
});
