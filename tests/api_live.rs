//! Live forecast-host tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use meteo_rs::normalize::normalize;
use meteo_rs::{Client, ForecastSource, PanelConfig};

#[test]
fn fetch_manifest() {
    let client = Client::new(&PanelConfig::default()).unwrap();
    let cities = client.fetch_cities().unwrap();
    assert!(!cities.is_empty());
    assert!(cities.iter().all(|c| !c.slug.is_empty()));
}

#[test]
fn fetch_first_city_forecast() {
    let client = Client::new(&PanelConfig::default()).unwrap();
    let cities = client.fetch_cities().unwrap();
    let slug = &cities[0].slug;
    let raw = client.fetch_forecast(slug).unwrap();
    let f = normalize(&raw, slug, &cities);
    assert!(!f.is_empty());
    assert_eq!(f.temp.len(), f.len());
}
