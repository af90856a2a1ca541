use crate::models::{Forecast, Metric};
use serde::{Deserialize, Serialize};

/// Summary statistics for one metric of a forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub metric: Metric,
    pub unit: String,
    pub count: usize,
    /// Non-finite samples (missing or non-numeric in the payload).
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Summary of a single series; non-finite samples are counted as missing.
pub fn summarize(metric: Metric, values: &[f64]) -> Summary {
    let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = if count > 0 {
        Some(vals.iter().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        metric,
        unit: metric.unit().to_string(),
        count,
        missing: values.len() - count,
        min,
        max,
        mean,
        median,
    }
}

/// One summary per metric, in [`Metric::ALL`] order.
pub fn forecast_summary(forecast: &Forecast) -> Vec<Summary> {
    Metric::ALL
        .into_iter()
        .map(|m| summarize(m, forecast.values(m)))
        .collect()
}

/// Total precipitation over the forecast window (sum of finite samples).
pub fn precip_total(forecast: &Forecast) -> f64 {
    forecast
        .values(Metric::Precipitation)
        .iter()
        .filter(|v| v.is_finite())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_even_and_missing() {
        let s = summarize(Metric::Temperature, &[4.0, f64::NAN, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.missing, 1);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(4.0));
        assert_eq!(s.median, Some(2.5));
        assert_eq!(s.mean, Some(2.5));
        assert_eq!(s.unit, "°C");
    }

    #[test]
    fn empty_series_has_no_stats() {
        let s = summarize(Metric::Wind, &[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.min, None);
        assert_eq!(s.median, None);
    }
}
