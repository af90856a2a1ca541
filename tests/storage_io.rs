use chrono::{Duration, TimeZone, Utc};
use meteo_rs::api::{DirSource, ForecastSource};
use meteo_rs::models::Forecast;
use meteo_rs::normalize::normalize;
use meteo_rs::storage;
use std::fs;
use tempfile::tempdir;

fn sample(n: usize) -> Forecast {
    let t0 = Utc.with_ymd_and_hms(2025, 9, 19, 0, 0, 0).unwrap();
    Forecast {
        city: "Guadalajara".into(),
        lat: 20.673,
        lon: -103.346,
        timestamps: (0..n).map(|i| t0 + Duration::hours(3 * i as i64)).collect(),
        temp: (0..n).map(|i| 22.0 + i as f64).collect(),
        precip: vec![0.0; n],
        wind: (0..n).map(|i| 4.0 + i as f64).collect(),
        rh: vec![55.0; n],
    }
}

#[test]
fn save_csv_and_json() {
    let rows = sample(3);
    let dir = tempdir().unwrap();

    let csv_path = dir.path().join("gdl.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("city,lat,lon,timestamp,temp,precip,wind,rh"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());

    let json_path = dir.path().join("gdl.json");
    storage::save_json(&rows, &json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v["temp"].as_array().unwrap().len(), rows.len());
    assert_eq!(v["city"], "Guadalajara");
}

// Exported JSON uses the payload layout, so a directory of exports is itself a data source.
#[test]
fn json_export_reads_back_through_dir_source() {
    let rows = sample(4);
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("wrf")).unwrap();
    storage::save_json(&rows, dir.path().join("wrf").join("guadalajara.json")).unwrap();

    let raw = DirSource::new(dir.path(), "wrf").fetch_forecast("guadalajara").unwrap();
    let back = normalize(&raw, "guadalajara", &[]);
    assert_eq!(back, rows);
}

#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let mut rows = sample(1);
    rows.city = "=HYPERLINK(\"http://evil\")".into();
    let dir = tempdir().unwrap();
    let path = dir.path().join("x.csv");
    storage::save_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let row = rdr.records().next().unwrap().unwrap();
    assert!(row.get(0).unwrap().starts_with("'="));
}

#[test]
fn missing_samples_are_empty_cells() {
    let mut rows = sample(2);
    rows.wind[1] = f64::NAN;
    let dir = tempdir().unwrap();
    let path = dir.path().join("x.csv");
    storage::save_csv(&rows, &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let second = rdr.records().nth(1).unwrap().unwrap();
    assert_eq!(second.get(6), Some(""));
}
