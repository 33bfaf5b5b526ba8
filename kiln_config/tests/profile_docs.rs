use std::fs;

use kiln_config::{PhaseDoc, ProfileDoc, load_profile, load_profile_csv, parse_profile_json};
use rstest::rstest;
use tempfile::tempdir;

#[test]
fn parses_firmware_column_layout() {
    let doc = parse_profile_json(r#"{ "Time": [10, 5], "Temperature": [100, 50] }"#)
        .expect("parse firmware JSON");
    assert_eq!(
        doc,
        ProfileDoc::Columns {
            time: vec![10, 5],
            temperature: vec![100.0, 50.0],
        }
    );
}

#[test]
fn parses_lowercase_columns_and_phase_list() {
    let cols = parse_profile_json(r#"{ "time": [60], "temperature": [120.5] }"#).unwrap();
    assert_eq!(cols.len(), 1);

    let phases = parse_profile_json(
        r#"{ "phases": [ { "duration_s": 60, "target_c": 120.5 }, { "duration_s": 30, "target_c": 20 } ] }"#,
    )
    .unwrap();
    assert_eq!(
        phases,
        ProfileDoc::Phases {
            phases: vec![
                PhaseDoc { duration_s: 60, target_c: 120.5 },
                PhaseDoc { duration_s: 30, target_c: 20.0 },
            ]
        }
    );
}

#[rstest]
#[case(r#"{ "Time": [-1], "Temperature": [100] }"#)]
#[case(r#"{ "Time": [10] }"#)]
#[case(r#"[1, 2, 3]"#)]
#[case("not json")]
fn rejects_malformed_json(#[case] text: &str) {
    assert!(parse_profile_json(text).is_err(), "accepted {text}");
}

#[test]
fn loads_each_format_by_extension() {
    let dir = tempdir().unwrap();

    let json = dir.path().join("config.txt");
    fs::write(&json, r#"{"Time":[10],"Temperature":[100]}"#).unwrap();
    assert_eq!(load_profile(&json).unwrap().len(), 1);

    let toml = dir.path().join("glaze.toml");
    fs::write(
        &toml,
        "phases = [ { duration_s = 10, target_c = 100.0 }, { duration_s = 5, target_c = 50.0 } ]\n",
    )
    .unwrap();
    assert_eq!(load_profile(&toml).unwrap().len(), 2);

    let csv = dir.path().join("bisque.csv");
    fs::write(&csv, "duration_s,target_c\n10,100\n5, 50\n20,900.5\n").unwrap();
    let doc = load_profile(&csv).unwrap();
    assert_eq!(doc.len(), 3);
    match doc {
        ProfileDoc::Phases { phases } => assert_eq!(phases[2].target_c, 900.5),
        other => panic!("csv should yield phases, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_extension_and_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_profile(&dir.path().join("profile.yaml")).expect_err("yaml unsupported");
    assert!(format!("{err}").contains("unsupported profile file"));

    let err = load_profile(&dir.path().join("missing.json")).expect_err("missing file");
    assert!(format!("{err}").contains("read profile"));
}

#[test]
fn csv_requires_exact_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "time,temperature\n10,100\n").unwrap();
    let err = load_profile_csv(&path).expect_err("bad header");
    assert!(format!("{err}").contains("must have headers 'duration_s,target_c'"));
}

#[test]
fn csv_reports_bad_row_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad_row.csv");
    fs::write(&path, "duration_s,target_c\n10,100\nten,200\n").unwrap();
    let err = load_profile_csv(&path).expect_err("bad row");
    assert!(format!("{err}").contains("invalid CSV row 3"), "{err}");
}

#[rstest]
#[case("time,temperature\n10,100\n", "must have headers 'duration_s,target_c'")]
#[case("duration_s,target_c\n10,100\nten,200\n", "invalid CSV row 3")]
fn csv_errors_surface_through_load_profile(#[case] body: &str, #[case] expected: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("profile.CSV");
    fs::write(&path, body).unwrap();
    let err = load_profile(&path).expect_err("bad csv");
    assert!(format!("{err}").contains(expected), "{err}");
}

#[test]
fn missing_csv_is_an_open_error() {
    let dir = tempdir().unwrap();
    let err = load_profile(&dir.path().join("missing.csv")).expect_err("missing csv");
    assert!(format!("{err}").contains("open profile CSV"), "{err}");
}
