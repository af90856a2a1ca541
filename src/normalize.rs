//! Turn a raw, possibly malformed forecast payload into a length-aligned [`Forecast`].
//!
//! Two coercion policies exist:
//! - [`CoercionPolicy::Substitute`] never fails: non-array fields become empty sequences,
//!   non-numeric samples become `NaN`, unparsable timestamps are dropped and missing
//!   metadata comes from the city table.
//! - [`CoercionPolicy::Reject`] reports the first malformed field as a [`ValidationError`].
//!
//! In both cases every sequence is truncated to the shortest one (front-aligned).

use crate::cities;
use crate::models::{City, Forecast, Metric};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// What to do with malformed payload content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Replace malformed content with empty/NaN/fallback values.
    #[default]
    Substitute,
    /// Fail on the first malformed field.
    Reject,
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("field `{field}` is not an array")]
    NotAnArray { field: &'static str },
    #[error("field `{field}` has a non-numeric value at index {index}")]
    NonNumeric { field: &'static str, index: usize },
    #[error("timestamp at index {index} is not a valid date: {value}")]
    BadTimestamp { index: usize, value: String },
    #[error("field `{field}` has the wrong type")]
    BadMetadata { field: &'static str },
}

/// Normalize with the [`CoercionPolicy::Substitute`] policy. Never fails.
pub fn normalize(raw: &Value, slug: &str, cities: &[City]) -> Forecast {
    normalize_with(raw, slug, cities, CoercionPolicy::Substitute).unwrap_or_else(|e| {
        log::warn!("substitute normalization failed for {slug}: {e}");
        empty_forecast(slug, cities)
    })
}

fn empty_forecast(slug: &str, cities: &[City]) -> Forecast {
    let city = cities::resolve(cities, slug);
    Forecast {
        city: city.name,
        lat: city.lat,
        lon: city.lon,
        timestamps: Vec::new(),
        temp: Vec::new(),
        precip: Vec::new(),
        wind: Vec::new(),
        rh: Vec::new(),
    }
}

/// Normalize under an explicit policy.
pub fn normalize_with(
    raw: &Value,
    slug: &str,
    cities: &[City],
    policy: CoercionPolicy,
) -> Result<Forecast, ValidationError> {
    let empty = Map::new();
    let obj = match raw.as_object() {
        Some(o) => o,
        None if policy == CoercionPolicy::Reject => return Err(ValidationError::NotAnObject),
        None => {
            log::debug!("payload for {slug} is not an object; using an empty one");
            &empty
        }
    };
    Normalizer::new(cities, policy).run(obj, slug)
}

/// Parse one timestamp in any of the forms the forecast producers emit.
///
/// Zone-less forms are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // WRF writes `YYYY-MM-DD_HH:MM:SS`
    let s = s.replacen('_', "T", 1);
    let naive = s.strip_suffix('Z').unwrap_or(&s);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

struct Normalizer<'a> {
    cities: &'a [City],
    policy: CoercionPolicy,
}

impl<'a> Normalizer<'a> {
    fn new(cities: &'a [City], policy: CoercionPolicy) -> Self {
        Self { cities, policy }
    }

    fn run(&self, obj: &Map<String, Value>, slug: &str) -> Result<Forecast, ValidationError> {
        let mut timestamps = self.timestamps(obj.get("timestamps"))?;
        let mut temp = self.metric(obj, Metric::Temperature)?;
        let mut precip = self.metric(obj, Metric::Precipitation)?;
        let mut wind = self.metric(obj, Metric::Wind)?;
        let mut rh = self.metric(obj, Metric::Humidity)?;

        let known = cities::resolve(self.cities, slug);
        let city = match obj.get("city") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            None | Some(Value::Null) => known.name.clone(),
            Some(_) => {
                self.reject(ValidationError::BadMetadata { field: "city" })?;
                known.name.clone()
            }
        };
        let lat = self.coordinate(obj.get("lat"), "lat")?.unwrap_or(known.lat);
        let lon = self.coordinate(obj.get("lon"), "lon")?.unwrap_or(known.lon);

        let n = [
            timestamps.len(),
            temp.len(),
            precip.len(),
            wind.len(),
            rh.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);
        timestamps.truncate(n);
        temp.truncate(n);
        precip.truncate(n);
        wind.truncate(n);
        rh.truncate(n);

        Ok(Forecast {
            city,
            lat,
            lon,
            timestamps,
            temp,
            precip,
            wind,
            rh,
        })
    }

    fn reject(&self, err: ValidationError) -> Result<(), ValidationError> {
        match self.policy {
            CoercionPolicy::Reject => Err(err),
            CoercionPolicy::Substitute => {
                log::debug!("substituting malformed payload content: {err}");
                Ok(())
            }
        }
    }

    fn array<'v>(
        &self,
        v: Option<&'v Value>,
        field: &'static str,
    ) -> Result<&'v [Value], ValidationError> {
        match v {
            Some(Value::Array(items)) => Ok(items.as_slice()),
            None | Some(Value::Null) if self.policy == CoercionPolicy::Substitute => Ok(&[]),
            _ => {
                self.reject(ValidationError::NotAnArray { field })?;
                Ok(&[])
            }
        }
    }

    fn timestamps(&self, v: Option<&Value>) -> Result<Vec<DateTime<Utc>>, ValidationError> {
        let items = self.array(v, "timestamps")?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str().and_then(parse_timestamp) {
                Some(ts) => out.push(ts),
                None => self.reject(ValidationError::BadTimestamp {
                    index,
                    value: item.to_string(),
                })?,
            }
        }
        Ok(out)
    }

    fn metric(&self, obj: &Map<String, Value>, metric: Metric) -> Result<Vec<f64>, ValidationError> {
        let field = metric.key();
        let raw = obj
            .get(field)
            .or_else(|| metric.alias().and_then(|a| obj.get(a)));
        let items = self.array(raw, field)?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_f64() {
                Some(v) => out.push(v),
                None => {
                    self.reject(ValidationError::NonNumeric { field, index })?;
                    out.push(f64::NAN);
                }
            }
        }
        Ok(out)
    }

    fn coordinate(&self, v: Option<&Value>, field: &'static str) -> Result<Option<f64>, ValidationError> {
        let parsed = match v {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed.filter(|x| x.is_finite()) {
            Some(x) => Ok(Some(x)),
            None => {
                self.reject(ValidationError::BadMetadata { field })?;
                Ok(None)
            }
        }
    }
}
