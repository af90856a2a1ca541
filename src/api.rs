/// Data sources for the city manifest and per-city forecast payloads.
///
/// Two implementations of [`ForecastSource`] ship with the crate:
/// - [`Client`]: blocking HTTP client against the static forecast host. Every request
///   bypasses caches (`Cache-Control: no-cache`, `Pragma: no-cache` and a `_=<millis>`
///   query parameter) so a reload always revalidates with the origin.
/// - [`DirSource`]: the same layout read from a local directory.
///
/// Layout (relative to `base_url/data_path` or the directory root):
/// - `cities.json`: `[{name, slug, lat, lon}, ...]`
/// - `<model>/<slug>.json`: `{city?, lat?, lon?, timestamps, temp, precip, wind, rh}`
///
/// Typical usage:
/// ```no_run
/// # use meteo_rs::api::{Client, ForecastSource};
/// # use meteo_rs::config::PanelConfig;
/// let client = Client::new(&PanelConfig::default())?;
/// let cities = client.fetch_cities()?;
/// let raw = client.fetch_forecast(&cities[0].slug)?;
/// # Ok::<(), meteo_rs::api::FetchError>(())
/// ```
use crate::cities;
use crate::config::PanelConfig;
use crate::models::City;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use reqwest::redirect::Policy;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed with HTTP {status}: {url}")]
    Status { status: u16, url: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("decode json from {origin}: {message}")]
    Decode { origin: String, message: String },
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected manifest shape from {0}: not an array")]
    Manifest(String),
}

/// Where the controller gets its data from. Implementations must be shareable
/// with the background load threads.
pub trait ForecastSource: Send + Sync {
    /// The city manifest, always fetched fresh.
    fn fetch_cities(&self) -> Result<Vec<City>, FetchError>;

    /// Raw payload for one city, always fetched fresh.
    fn fetch_forecast(&self, slug: &str) -> Result<Value, FetchError>;
}

// Allow -, _, . unescaped in path segments (common for slugs and model ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment.trim(), SAFE).to_string()
}

fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    pub data_path: String,
    pub model: String,
    http: HttpClient,
}

impl Client {
    pub fn new(config: &PanelConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("meteo_rs/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            data_path: config.data_path.trim_matches('/').to_string(),
            model: config.model.clone(),
            http,
        })
    }

    fn root(&self) -> String {
        if self.data_path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, self.data_path)
        }
    }

    pub fn cities_url(&self) -> String {
        format!("{}/cities.json", self.root())
    }

    pub fn forecast_url(&self, slug: &str) -> String {
        format!("{}/{}/{}.json", self.root(), enc(&self.model), enc(slug))
    }

    /// GET with a small retry for transient failures (5xx / network errors).
    fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut last_err: Option<FetchError> = None;
        for backoff_ms in [100u64, 300, 700] {
            let fresh = format!("{url}?_={}", cache_buster());
            match self.http.get(&fresh).send() {
                Ok(r) if r.status().is_success() => {
                    return r.json().map_err(|e| FetchError::Decode {
                        origin: url.to_string(),
                        message: e.to_string(),
                    });
                }
                Ok(r) if r.status().is_server_error() => {
                    log::debug!("GET {url} returned {}; retrying", r.status());
                    last_err = Some(FetchError::Status {
                        status: r.status().as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(r) => {
                    return Err(FetchError::Status {
                        status: r.status().as_u16(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    log::debug!("GET {url} failed: {e}; retrying");
                    last_err = Some(FetchError::Network(e.to_string()));
                }
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(last_err.unwrap_or_else(|| FetchError::Network(format!("GET {url} failed"))))
    }
}

impl ForecastSource for Client {
    fn fetch_cities(&self) -> Result<Vec<City>, FetchError> {
        let url = self.cities_url();
        let v = self.get_json(&url)?;
        cities::parse_manifest(&v).ok_or(FetchError::Manifest(url))
    }

    fn fetch_forecast(&self, slug: &str) -> Result<Value, FetchError> {
        self.get_json(&self.forecast_url(slug))
    }
}

/// Reads the forecast layout from a local directory (e.g. a checkout of the static site).
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    model: String,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P, model: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            model: model.to_string(),
        }
    }

    pub fn forecast_path(&self, slug: &str) -> PathBuf {
        self.root.join(&self.model).join(format!("{slug}.json"))
    }

    fn read_json(path: &Path) -> Result<Value, FetchError> {
        let bytes = std::fs::read(path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode {
            origin: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl ForecastSource for DirSource {
    fn fetch_cities(&self) -> Result<Vec<City>, FetchError> {
        let path = self.root.join("cities.json");
        let v = Self::read_json(&path)?;
        cities::parse_manifest(&v).ok_or_else(|| FetchError::Manifest(path.display().to_string()))
    }

    fn fetch_forecast(&self, slug: &str) -> Result<Value, FetchError> {
        // Slugs never contain path separators; refuse anything that would escape the root.
        if slug.is_empty() || slug.contains(['/', '\\']) || slug.contains("..") {
            return Err(FetchError::Io {
                path: self.root.join(slug),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid slug"),
            });
        }
        Self::read_json(&self.forecast_path(slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_layout_and_encode_segments() {
        let mut cfg = PanelConfig::default();
        cfg.base_url = "https://example.org/site/".into();
        cfg.data_path = "/data/meteogram/".into();
        cfg.model = "wrf".into();
        let c = Client::new(&cfg).unwrap();
        assert_eq!(c.cities_url(), "https://example.org/site/data/meteogram/cities.json");
        assert_eq!(
            c.forecast_url("san luis"),
            "https://example.org/site/data/meteogram/wrf/san%20luis.json"
        );
    }

    #[test]
    fn dir_source_rejects_escaping_slugs() {
        let src = DirSource::new("/tmp/nowhere", "wrf");
        assert!(matches!(src.fetch_forecast("../etc"), Err(FetchError::Io { .. })));
    }
}
