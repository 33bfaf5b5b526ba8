use kiln_config::load_toml;
use rstest::rstest;

const VALID: &str = r#"
[pins]
thermo_clk = 6
thermo_cs = 7
thermo_do = 8
relay = 3
button = 2

[control]
sample_period_ms = 1000
ambient_c = 25.0
poll_ms = 5
settle_ms = 100

[profile]
on_error = "empty"
phases = [
    { duration_s = 600, target_c = 100.0 },
    { duration_s = 300, target_c = 50.0 },
]

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn accepts_full_config() {
    let cfg = load_toml(VALID).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    let phases = cfg.profile.phases.as_ref().expect("inline phases");
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[1].duration_s, 300);
    assert_eq!(cfg.profile.on_error, kiln_config::ProfileFallback::Empty);
}

#[rstest]
#[case("[control]\nsample_period_ms = 0", "sample_period_ms must be >= 1")]
#[case("[control]\nsample_period_ms = 120000", "unreasonably large")]
#[case("[control]\npoll_ms = 0", "poll_ms must be >= 1")]
#[case(
    "[control]\nsample_period_ms = 10\npoll_ms = 10",
    "poll_ms must be < control.sample_period_ms"
)]
#[case("[control]\nambient_c = nan", "ambient_c must be finite")]
#[case("[control]\nsettle_ms = 5000", "settle_ms is unreasonably large")]
#[case("[sim]\nloss_per_sample = 1.5", "loss_per_sample must be in")]
#[case("[sim]\nheat_c_per_sample = -1.0", "heat_c_per_sample must be >= 0.0")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
#[case(
    "[profile]\npath = \"a.json\"\nphases = []",
    "mutually exclusive"
)]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn rejects_unknown_fallback_mode() {
    let err = load_toml("[profile]\non_error = \"guess\"").expect_err("unknown variant");
    assert!(format!("{err}").contains("unknown variant"));
}
