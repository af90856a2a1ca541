use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::process::Command;

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cities.json"),
        json!([{"name": "Veracruz", "slug": "veracruz", "lat": 19.173, "lon": -96.134}]).to_string(),
    )
    .unwrap();
    fs::create_dir(dir.path().join("wrf")).unwrap();
    fs::write(
        dir.path().join("wrf").join("veracruz.json"),
        json!({
            "timestamps": ["2025-09-19T00:00:00Z", "2025-09-19T01:00:00Z", "2025-09-19T02:00:00Z"],
            "temp": [26.0, 25.5, 25.1],
            "precip": [0.0, 0.4, 1.1],
            "wind": [12.0, 10.0, 9.0],
            "rh": [80, 83, 85]
        })
        .to_string(),
    )
    .unwrap();
    dir
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("meteo").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("meteo"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn link_prints_deep_link() {
    let mut cmd = Command::cargo_bin("meteo").unwrap();
    cmd.args(["link", "veracruz", "--model", "wrf"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("?model=wrf&city=veracruz#meteograma"));
}

#[test]
fn cities_fall_back_when_manifest_is_missing() {
    let empty = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("meteo").unwrap();
    cmd.arg("cities").arg("--data-dir").arg(empty.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ciudad-de-mexico"))
        .stdout(predicate::str::contains("guadalajara"));
}

#[test]
fn render_from_local_directory() {
    let site = site();
    let out = tempfile::tempdir().unwrap();
    let export = out.path().join("veracruz.csv");
    let mut cmd = Command::cargo_bin("meteo").unwrap();
    cmd.arg("render")
        .arg("--data-dir")
        .arg(site.path())
        .arg("--city")
        .arg("veracruz")
        .arg("--out-dir")
        .arg(out.path())
        .arg("--export")
        .arg(&export)
        .arg("--stats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("count=3"));

    for metric in ["temp", "precip", "wind", "rh"] {
        let p = out.path().join(format!("veracruz_{metric}.svg"));
        let svg = fs::read_to_string(&p).unwrap();
        assert!(svg.starts_with("<svg"), "{}", p.display());
    }
    assert_eq!(fs::read_to_string(&export).unwrap().lines().count(), 4);
}

#[test]
fn render_reports_missing_city() {
    let site = site();
    let out = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("meteo").unwrap();
    cmd.arg("render")
        .arg("--data-dir")
        .arg(site.path())
        .arg("--city")
        .arg("atlantis")
        .arg("--out-dir")
        .arg(out.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("atlantis"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn render_online_first_city() {
    let out = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("meteo").unwrap();
    cmd.arg("render").arg("--out-dir").arg(out.path()).arg("--stats");
    cmd.assert().success();
}
