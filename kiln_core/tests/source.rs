use std::fs;

use kiln_config::ProfileFallback;
use kiln_core::{FileProfileSource, KilnError, Profile, ProfileError, ProfileSource};
use rstest::rstest;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let p = dir.path().join(name);
    fs::write(&p, body).expect("write profile");
    p
}

#[rstest]
fn loads_firmware_json() {
    let dir = TempDir::new().unwrap();
    let p = write(&dir, "config.json", r#"{"Time":[10,5],"Temperature":[100,50]}"#);

    let profile = FileProfileSource::new(&p).load().unwrap();
    assert_eq!(profile, Profile::from_pairs([(10, 100.0), (5, 50.0)]).unwrap());
}

#[rstest]
fn loads_csv_and_toml() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "p.csv", "duration_s,target_c\n600,100.0\n1800,600.0\n");
    let toml = write(
        &dir,
        "p.toml",
        "[[phases]]\nduration_s = 600\ntarget_c = 100.0\n\n[[phases]]\nduration_s = 1800\ntarget_c = 600.0\n",
    );

    let a = FileProfileSource::new(csv).load().unwrap();
    let b = FileProfileSource::new(toml).load().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.total_duration_s(), 2400);
}

#[rstest]
fn missing_file_is_a_config_error_when_strict() {
    let dir = TempDir::new().unwrap();
    let err = FileProfileSource::new(dir.path().join("nope.json"))
        .load()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<KilnError>(),
        Some(KilnError::Config(_))
    ));
}

#[rstest]
#[case("nope.json", None)]
#[case("broken.json", Some("{not json"))]
fn unreadable_profile_falls_back_to_empty(#[case] name: &str, #[case] body: Option<&str>) {
    let dir = TempDir::new().unwrap();
    let path = match body {
        Some(b) => write(&dir, name, b),
        None => dir.path().join(name),
    };
    let profile = FileProfileSource::new(path)
        .with_fallback(ProfileFallback::Empty)
        .load()
        .unwrap();
    assert!(profile.is_empty());
}

#[rstest]
fn invalid_profile_is_never_masked() {
    let dir = TempDir::new().unwrap();
    let p = write(&dir, "zero.json", r#"{"Time":[10,0],"Temperature":[100,50]}"#);

    let err = FileProfileSource::new(p)
        .with_fallback(ProfileFallback::Empty)
        .load()
        .unwrap_err();
    match err.downcast_ref::<KilnError>() {
        Some(KilnError::Profile(ProfileError::ZeroDuration { index: 1 })) => {}
        other => panic!("expected ZeroDuration at 1, got: {other:?}"),
    }
}

#[rstest]
fn profile_is_its_own_source() {
    let p = Profile::from_pairs([(60, 200.0)]).unwrap();
    assert_eq!(ProfileSource::load(&p).unwrap(), p);
}

#[rstest]
#[case("empty.json", r#"{"Time":[],"Temperature":[]}"#)]
#[case("empty.toml", "phases = []\n")]
#[case("empty.csv", "duration_s,target_c\n")]
fn document_without_phases_loads_as_empty_profile(#[case] name: &str, #[case] body: &str) {
    let dir = TempDir::new().unwrap();
    let p = write(&dir, name, body);

    let profile = FileProfileSource::new(p).load().unwrap();
    assert!(profile.is_empty());
    assert_eq!(profile.total_duration_s(), 0);
}
