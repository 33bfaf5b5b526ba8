#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<kiln_config::Config>(data) {
        let _ = cfg.validate();
        if let Some(phases) = cfg.profile.phases.as_deref() {
            let _ = kiln_core::Profile::try_from(phases);
        }
    }
});
