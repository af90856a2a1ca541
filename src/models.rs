use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A known location with a URL-safe identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct City {
    pub name: String,
    /// Manifests written by hand sometimes omit the slug; it is derived from `name` then.
    #[serde(default)]
    pub slug: String,
    /// Some manifests encode coordinates as strings, others as numbers.
    /// Accept both and normalize to `f64`.
    #[serde(deserialize_with = "de_f64_from_string_or_number")]
    pub lat: f64,
    #[serde(deserialize_with = "de_f64_from_string_or_number")]
    pub lon: f64,
}

impl City {
    pub fn new(name: &str, slug: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            lat,
            lon,
        }
    }
}

/// Serde helper: parse `f64` from either a JSON number or a string.
fn de_f64_from_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct F64Visitor;

    impl<'de> Visitor<'de> for F64Visitor {
        type Value = f64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or number representing a coordinate")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<f64>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(F64Visitor)
}

/// Normalized forecast for one city and one model run.
///
/// All five sequences have the same length; index `i` of every metric belongs to `timestamps[i]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub timestamps: Vec<DateTime<Utc>>,
    /// Air temperature at 2 m, °C.
    pub temp: Vec<f64>,
    /// Precipitation, mm.
    pub precip: Vec<f64>,
    /// Wind speed at 10 m, km/h.
    pub wind: Vec<f64>,
    /// Relative humidity, %.
    pub rh: Vec<f64>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Temperature => &self.temp,
            Metric::Precipitation => &self.precip,
            Metric::Wind => &self.wind,
            Metric::Humidity => &self.rh,
        }
    }

    /// Borrow one metric together with the shared time axis.
    pub fn series(&self, metric: Metric) -> SeriesView<'_> {
        SeriesView {
            timestamps: &self.timestamps,
            values: self.values(metric),
        }
    }
}

/// A `{timestamps, values}` pair handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    pub timestamps: &'a [DateTime<Utc>],
    pub values: &'a [f64],
}

/// The four charted variables, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Temperature,
    Precipitation,
    Wind,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Precipitation,
        Metric::Wind,
        Metric::Humidity,
    ];

    /// Payload field name.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Temperature => "temp",
            Metric::Precipitation => "precip",
            Metric::Wind => "wind",
            Metric::Humidity => "rh",
        }
    }

    /// Field name used by the upstream forecast generator, if different.
    pub fn alias(self) -> Option<&'static str> {
        match self {
            Metric::Temperature => Some("t2m"),
            Metric::Precipitation => Some("tp"),
            Metric::Wind | Metric::Humidity => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Precipitation => "Precipitation",
            Metric::Wind => "Wind",
            Metric::Humidity => "Relative humidity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Precipitation => "mm",
            Metric::Wind => "km/h",
            Metric::Humidity => "%",
        }
    }
}

/// Pixel-space plotting area plus the value range it represents (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DrawRect {
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }
}
