//! Utility functions for visualization: colors and per-metric chart defaults.

use super::types::{ChartSpec, Rgb8, SeriesKind};
use crate::models::Metric;
use crate::scale::peak;

/// Microsoft Office (2013+) chart series palette, one entry per metric.
const METRIC_COLORS: [Rgb8; 4] = [
    Rgb8::new(237, 125, 49), // orange    (#ED7D31) temperature
    Rgb8::new(68, 114, 196), // blue      (#4472C4) precipitation
    Rgb8::new(112, 173, 71), // green     (#70AD47) wind
    Rgb8::new(91, 155, 213), // light blue(#5B9BD5) humidity
];

pub const BACKGROUND: Rgb8 = Rgb8::new(255, 255, 255);
pub const FRAME: Rgb8 = Rgb8::new(165, 165, 165);
pub const GRID: Rgb8 = Rgb8::new(230, 230, 230);
pub const LABEL: Rgb8 = Rgb8::new(99, 99, 99);

#[inline]
pub fn metric_color(metric: Metric) -> Rgb8 {
    METRIC_COLORS[metric as usize]
}

/// Default display options for a metric.
///
/// Precipitation and wind are pinned at zero and scale to 1.1× the observed peak
/// (with a floor of 5 mm and 10 km/h); humidity is always 0..100.
pub fn chart_spec(metric: Metric, values: &[f64]) -> ChartSpec {
    let color = metric_color(metric);
    let unit = metric.unit();
    match metric {
        Metric::Temperature => ChartSpec::new(unit, SeriesKind::Line, color),
        Metric::Precipitation => ChartSpec::new(unit, SeriesKind::Bar, color)
            .locked(0.0, (peak(values) * 1.1).max(5.0)),
        Metric::Wind => {
            ChartSpec::new(unit, SeriesKind::Line, color).locked(0.0, (peak(values) * 1.1).max(10.0))
        }
        Metric::Humidity => ChartSpec::new(unit, SeriesKind::Line, color).locked(0.0, 100.0),
    }
}
