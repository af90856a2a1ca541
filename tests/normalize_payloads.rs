use meteo_rs::cities::fallback_cities;
use meteo_rs::normalize::{CoercionPolicy, ValidationError, normalize, normalize_with};
use serde_json::json;

fn aligned(f: &meteo_rs::Forecast) -> bool {
    let n = f.timestamps.len();
    [f.temp.len(), f.precip.len(), f.wind.len(), f.rh.len()]
        .iter()
        .all(|&l| l == n)
}

#[test]
fn ragged_payload_truncates_to_shortest() {
    let raw = json!({
        "timestamps": ["2025-09-19T00:00:00Z", "2025-09-19T01:00:00Z", "2025-09-19T02:00:00Z"],
        "temp": [1, 2],
        "precip": [3, 3, 3],
        "wind": [9, 9, 9, 9],
        "rh": []
    });
    let f = normalize(&raw, "veracruz", &fallback_cities());
    assert_eq!(f.len(), 0);
    assert!(aligned(&f));
    assert!(f.temp.is_empty() && f.precip.is_empty() && f.wind.is_empty());
}

#[test]
fn truncation_keeps_the_front() {
    let raw = json!({
        "timestamps": ["2025-09-19T00:00:00Z", "2025-09-19T01:00:00Z", "2025-09-19T02:00:00Z"],
        "temp": [1.0, 2.0],
        "precip": [3.0, 4.0, 5.0],
        "wind": [9.0, 8.0, 7.0],
        "rh": [50.0, 60.0, 70.0]
    });
    let f = normalize(&raw, "veracruz", &fallback_cities());
    assert_eq!(f.len(), 2);
    assert_eq!(f.precip, vec![3.0, 4.0]);
    assert_eq!(f.rh, vec![50.0, 60.0]);
    assert!(aligned(&f));
}

#[test]
fn metadata_falls_back_to_city_table() {
    let raw = json!({ "timestamps": [], "temp": [], "precip": [], "wind": [], "rh": [] });
    let f = normalize(&raw, "guadalajara", &fallback_cities());
    assert_eq!(f.city, "Guadalajara");
    assert_eq!((f.lat, f.lon), (20.673, -103.346));

    // unknown slug: first known city
    let f = normalize(&raw, "atlantis", &fallback_cities());
    assert_eq!(f.city, "Ciudad de México");
}

#[test]
fn payload_metadata_wins_and_accepts_numeric_strings() {
    let raw = json!({
        "city": "Xalapa",
        "lat": "19.54",
        "lon": -96.91,
        "timestamps": ["2025-09-19_00:00:00"],
        "temp": [18.2], "precip": [0.1], "wind": [4.0], "rh": [91]
    });
    let f = normalize(&raw, "xalapa", &fallback_cities());
    assert_eq!(f.city, "Xalapa");
    assert!((f.lat - 19.54).abs() < 1e-9);
    assert_eq!(f.lon, -96.91);
    assert_eq!(f.len(), 1);
}

#[test]
fn garbage_never_fails_under_substitute() {
    for raw in [json!(null), json!("text"), json!([1, 2]), json!({"temp": "hot", "timestamps": 5})] {
        let f = normalize(&raw, "veracruz", &fallback_cities());
        assert!(f.is_empty());
        assert!(aligned(&f));
        assert_eq!(f.city, "Veracruz");
    }
}

#[test]
fn non_numeric_samples_become_nan() {
    let raw = json!({
        "timestamps": ["2025-09-19T00:00:00Z", "2025-09-19T01:00:00Z"],
        "temp": [20, "n/a"], "precip": [0, 0], "wind": [1, 2], "rh": [50, 50]
    });
    let f = normalize(&raw, "veracruz", &fallback_cities());
    assert_eq!(f.len(), 2);
    assert_eq!(f.temp[0], 20.0);
    assert!(f.temp[1].is_nan());
}

#[test]
fn reject_policy_reports_first_problem() {
    let cities = fallback_cities();
    assert_eq!(
        normalize_with(&json!([]), "veracruz", &cities, CoercionPolicy::Reject),
        Err(ValidationError::NotAnObject)
    );

    let raw = json!({
        "timestamps": ["2025-09-19T00:00:00Z"],
        "temp": [20], "precip": "none", "wind": [1], "rh": [50]
    });
    assert_eq!(
        normalize_with(&raw, "veracruz", &cities, CoercionPolicy::Reject),
        Err(ValidationError::NotAnArray { field: "precip" })
    );

    let raw = json!({
        "timestamps": ["yesterday"],
        "temp": [20], "precip": [0], "wind": [1], "rh": [50]
    });
    assert!(matches!(
        normalize_with(&raw, "veracruz", &cities, CoercionPolicy::Reject),
        Err(ValidationError::BadTimestamp { index: 0, .. })
    ));

    let raw = json!({
        "timestamps": ["2025-09-19T00:00:00Z"],
        "temp": [20], "precip": [0], "wind": [1], "rh": [50]
    });
    let f = normalize_with(&raw, "veracruz", &cities, CoercionPolicy::Reject).unwrap();
    assert_eq!(f.len(), 1);
}
