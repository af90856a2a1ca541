//! Panel configuration: where forecasts come from and how charts are sized.
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelConfig {
    /// Origin serving the static forecast files.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path below `base_url` holding `cities.json` and the model directories.
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Forecast model id; selects the payload directory and appears in deep links.
    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Whole-hour offset from UTC for time labels (e.g. -6).
    #[serde(default)]
    pub label_utc_offset_hours: i32,

    /// Chart size in CSS pixels.
    #[serde(default = "default_chart_width")]
    pub chart_width: f64,
    #[serde(default = "default_chart_height")]
    pub chart_height: f64,

    /// Backing pixels per CSS pixel for file output.
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,

    /// TrueType font for bitmap output.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://pronosticosnumericos.github.io/wrf".to_string()
}

fn default_data_path() -> String {
    "data/meteogram".to_string()
}

fn default_model() -> String {
    "wrf".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_chart_width() -> f64 {
    640.0
}

const fn default_chart_height() -> f64 {
    220.0
}

const fn default_pixel_ratio() -> f64 {
    1.0
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_path: default_data_path(),
            model: default_model(),
            timeout_secs: default_timeout(),
            label_utc_offset_hours: 0,
            chart_width: default_chart_width(),
            chart_height: default_chart_height(),
            pixel_ratio: default_pixel_ratio(),
            font_path: None,
        }
    }
}

impl PanelConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<config dir>/meteo-rs/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("meteo-rs").join("config.json"))
    }

    /// Explicit file if given; else the default file when it exists; else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::info!("loading config from {}", path.display());
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn css_size(&self) -> (f64, f64) {
        (self.chart_width, self.chart_height)
    }
}
