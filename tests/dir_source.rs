use meteo_rs::api::{DirSource, FetchError, ForecastSource};
use meteo_rs::cities::parse_manifest;
use meteo_rs::normalize::normalize;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn site() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("cities.json"),
        json!([
            {"name": "Mérida", "lat": "20.967", "lon": "-89.623"},
            {"name": "Veracruz", "slug": "veracruz", "lat": 19.173, "lon": -96.134},
            {"name": "broken"}
        ])
        .to_string(),
    )
    .unwrap();
    fs::create_dir(dir.path().join("wrf")).unwrap();
    fs::write(
        dir.path().join("wrf").join("veracruz.json"),
        json!({
            "timestamps": ["2025-09-19_00:00:00", "2025-09-19_03:00:00"],
            "t2m": [26.1, 25.4],
            "tp": [0.0, 0.2],
            "wind": [11.0, 9.5],
            "rh": [78, 81]
        })
        .to_string(),
    )
    .unwrap();
    dir
}

#[test]
fn reads_manifest_and_derives_slugs() {
    let dir = site();
    let src = DirSource::new(dir.path(), "wrf");
    let cities = src.fetch_cities().unwrap();
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].slug, "merida");
    assert!((cities[0].lat - 20.967).abs() < 1e-9);
}

#[test]
fn reads_forecast_payload() {
    let dir = site();
    let src = DirSource::new(dir.path(), "wrf");
    let cities = src.fetch_cities().unwrap();
    let raw = src.fetch_forecast("veracruz").unwrap();
    let f = normalize(&raw, "veracruz", &cities);
    assert_eq!(f.city, "Veracruz");
    assert_eq!(f.len(), 2);
    assert_eq!(f.temp, vec![26.1, 25.4]);
}

#[test]
fn missing_files_and_bad_json_are_errors() {
    let dir = site();
    let src = DirSource::new(dir.path(), "wrf");
    assert!(matches!(src.fetch_forecast("nowhere"), Err(FetchError::Io { .. })));

    fs::write(dir.path().join("wrf").join("bad.json"), "{not json").unwrap();
    assert!(matches!(src.fetch_forecast("bad"), Err(FetchError::Decode { .. })));

    fs::write(dir.path().join("cities.json"), r#"{"cities": []}"#).unwrap();
    assert!(matches!(src.fetch_cities(), Err(FetchError::Manifest(_))));
}

#[test]
fn manifest_must_be_an_array() {
    assert!(parse_manifest(&json!({"a": 1})).is_none());
    assert_eq!(parse_manifest(&json!([])).unwrap().len(), 0);
}
