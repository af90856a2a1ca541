//! Visualization: render meteogram charts onto any drawing [`Surface`].
//!
//! - One chart per metric: background, framed plot area, value ticks with gridlines,
//!   the series (polyline or bars) and strided `DD/MM HHh` time labels
//! - Crisp output at any pixel density: backing buffer is `css size × ratio`,
//!   drawing happens in CSS pixels under a uniform scale
//! - Backends: Plotters (SVG/PNG files or in-memory SVG), a recording surface,
//!   and any host surface implementing the trait

pub mod plotters_surface;
pub mod recording;
pub mod surface;
pub mod text;
pub mod types;
pub mod util;

pub use surface::{LabelStyle, Rect, RenderError, Surface, TextAlign, TextBaseline, Transform};
pub use types::{ChartSpec, PADDING, Rgb8, SeriesKind};

use crate::models::{DrawRect, Forecast, Metric, SeriesView};
use crate::scale::{DEFAULT_TICKS, linear_map, min_max, tick_values};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{FixedOffset, Offset, Utc};
use plotters::style::FontStyle;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use plotters_surface::PlottersSurface;
use surface::{backing_size, effective_ratio};
use text::{fit_font_px, format_tick, format_time_label};
use types::{BAR_GAP_PX, LABEL_FONT_PX, LINE_WIDTH_PX, MIN_X_LABELS, X_LABEL_SPACING_PX};
use util::{BACKGROUND, FRAME, GRID, LABEL, chart_spec};

/// Set once a TTF has been registered for the `ab_glyph` text path.
/// Bitmap output cannot draw text without it; SVG output does not need it.
static FONT_READY: AtomicBool = AtomicBool::new(false);

/// Register a TrueType font as the "sans-serif" family used for chart labels.
pub fn register_font_file(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read font {}", path.display()))?;
    // ab_glyph keeps a reference for the lifetime of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
        .map_err(|_| anyhow!("invalid font {}", path.display()))?;
    FONT_READY.store(true, Ordering::SeqCst);
    Ok(())
}

/// Draws single-metric charts. Holds the offset used for time labels.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    label_offset: FixedOffset,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            label_offset: utc(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl ChartRenderer {
    pub fn new(label_offset: FixedOffset) -> Self {
        Self { label_offset }
    }

    /// Labels shifted by whole hours from UTC (e.g. `-6` for CST). Out-of-range values fall back to UTC.
    pub fn with_utc_offset_hours(hours: i32) -> Self {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(utc);
        Self::new(offset)
    }

    pub fn label_offset(&self) -> FixedOffset {
        self.label_offset
    }

    /// Render one chart.
    ///
    /// Returns the plot area used, or `None` when there is no surface to draw on.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: Option<&mut S>,
        series: SeriesView<'_>,
        spec: &ChartSpec,
    ) -> Result<Option<DrawRect>, RenderError> {
        let Some(surface) = surface else {
            return Ok(None);
        };

        let (css_w, css_h) = surface.css_size();
        let ratio = effective_ratio(surface.pixel_ratio());
        let (bw, bh) = backing_size((css_w, css_h), ratio);
        surface.set_backing_size(bw, bh)?;
        surface.set_transform(Transform::scale(ratio))?;

        let full = Rect::new(0.0, 0.0, css_w.max(0.0), css_h.max(0.0));
        surface.clear_rect(full)?;
        surface.fill_rect(full, BACKGROUND)?;

        let rect = plot_rect((css_w, css_h), y_range(series.values, spec));
        surface.stroke_rect(Rect::new(rect.x, rect.y, rect.w, rect.h), FRAME, 1.0)?;

        self.draw_y_axis(surface, &rect, &spec.unit)?;
        match spec.kind {
            SeriesKind::Line => draw_line(surface, &rect, series.values, spec)?,
            SeriesKind::Bar => draw_bars(surface, &rect, series.values, spec)?,
        }
        self.draw_x_labels(surface, &rect, series, spec.kind)?;
        Ok(Some(rect))
    }

    fn draw_y_axis<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        rect: &DrawRect,
        unit: &str,
    ) -> Result<(), RenderError> {
        let step = (rect.y_max - rect.y_min) / DEFAULT_TICKS as f64;
        for t in tick_values(rect.y_min, rect.y_max, DEFAULT_TICKS) {
            let y = linear_map(t, rect.y_min, rect.y_max, rect.bottom(), rect.y);
            surface.begin_path();
            surface.move_to(rect.x, y);
            surface.line_to(rect.right(), y);
            surface.stroke(GRID, 1.0)?;

            let label = format_tick(t, step, unit);
            let style = LabelStyle {
                font_px: fit_font_px(&label, LABEL_FONT_PX, PADDING.left - 6.0),
                color: LABEL,
                align: TextAlign::Right,
                baseline: TextBaseline::Middle,
            };
            surface.fill_text(&label, rect.x - 4.0, y, &style)?;
        }
        Ok(())
    }

    fn draw_x_labels<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        rect: &DrawRect,
        series: SeriesView<'_>,
        kind: SeriesKind,
    ) -> Result<(), RenderError> {
        // No usable first timestamp: skip the time axis entirely.
        if series.timestamps.first().is_none() {
            return Ok(());
        }
        let n = series.values.len();
        let style = LabelStyle {
            font_px: LABEL_FONT_PX,
            color: LABEL,
            align: TextAlign::Center,
            baseline: TextBaseline::Top,
        };
        for idx in x_label_indices(n, rect.w) {
            let Some(ts) = series.timestamps.get(idx) else {
                continue;
            };
            let x = match kind {
                SeriesKind::Line => point_x(idx, n, rect),
                SeriesKind::Bar => bar_center_x(idx, n, rect),
            };
            let label = format_time_label(ts, &self.label_offset);
            surface.fill_text(&label, x, rect.bottom() + 6.0, &style)?;
        }
        Ok(())
    }
}

/// Value range for a chart: the lock verbatim when it is finite, else derived from the data.
pub fn y_range(values: &[f64], spec: &ChartSpec) -> (f64, f64) {
    match spec.lock {
        Some((lo, hi)) if lo.is_finite() && hi.is_finite() => (lo, hi),
        Some(lock) => {
            log::debug!("ignoring non-finite lock {lock:?}");
            min_max(values)
        }
        None => min_max(values),
    }
}

/// Plot area inside the fixed padding for a surface of `css` size.
pub fn plot_rect(css: (f64, f64), (y_min, y_max): (f64, f64)) -> DrawRect {
    DrawRect {
        x: PADDING.left,
        y: PADDING.top,
        w: (css.0 - PADDING.left - PADDING.right).max(0.0),
        h: (css.1 - PADDING.top - PADDING.bottom).max(0.0),
        y_min,
        y_max,
    }
}

/// Indices that get a time label: at most `max(3, floor(plot_w / 90))`, evenly strided from 0.
pub fn x_label_indices(n: usize, plot_w: f64) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let by_width = (plot_w / X_LABEL_SPACING_PX).floor();
    let by_width = if by_width.is_finite() && by_width > 0.0 {
        by_width as usize
    } else {
        0
    };
    let max_labels = MIN_X_LABELS.max(by_width);
    let stride = n.div_ceil(max_labels).max(1);
    (0..n).step_by(stride).collect()
}

fn point_x(idx: usize, n: usize, rect: &DrawRect) -> f64 {
    linear_map(
        idx as f64,
        0.0,
        n.saturating_sub(1) as f64,
        rect.x,
        rect.right(),
    )
}

fn bar_center_x(idx: usize, n: usize, rect: &DrawRect) -> f64 {
    let slot = rect.w / n.max(1) as f64;
    rect.x + slot * (idx as f64 + 0.5)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn draw_line<S: Surface + ?Sized>(
    surface: &mut S,
    rect: &DrawRect,
    values: &[f64],
    spec: &ChartSpec,
) -> Result<(), RenderError> {
    if values.is_empty() {
        return Ok(());
    }
    let n = values.len();
    let (lo, hi) = ordered(rect.y_min, rect.y_max);
    surface.begin_path();
    let mut pen_down = false;
    for (idx, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            pen_down = false;
            continue;
        }
        let x = point_x(idx, n, rect);
        let y = linear_map(v.clamp(lo, hi), rect.y_min, rect.y_max, rect.bottom(), rect.y);
        if pen_down {
            surface.line_to(x, y);
        } else {
            surface.move_to(x, y);
            pen_down = true;
        }
    }
    surface.stroke(spec.color, LINE_WIDTH_PX)
}

fn draw_bars<S: Surface + ?Sized>(
    surface: &mut S,
    rect: &DrawRect,
    values: &[f64],
    spec: &ChartSpec,
) -> Result<(), RenderError> {
    if values.is_empty() || rect.w <= 0.0 || rect.h <= 0.0 {
        return Ok(());
    }
    let slot = rect.w / values.len() as f64;
    let bar_w = (slot - BAR_GAP_PX).max(1.0);
    let (lo, hi) = ordered(rect.y_min, rect.y_max);
    let base = rect.bottom();
    for (idx, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        let top = linear_map(v.clamp(lo, hi), rect.y_min, rect.y_max, base, rect.y)
            .clamp(rect.y, base);
        let h = base - top;
        if h <= 0.0 {
            continue;
        }
        let x = rect.x + slot * idx as f64 + BAR_GAP_PX / 2.0;
        // narrow plots: the 1px minimum must not spill past the frame
        let w = bar_w.min(rect.right() - x);
        if w <= 0.0 {
            continue;
        }
        surface.fill_rect(Rect::new(x, top, w, h), spec.color)?;
    }
    Ok(())
}

/// Output format for chart files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "svg" => Some(ChartFormat::Svg),
            "png" => Some(ChartFormat::Png),
            _ => None,
        }
    }
}

/// Render one metric of `forecast` into a file; the format follows the extension.
pub fn plot_metric<P: AsRef<Path>>(
    forecast: &Forecast,
    metric: Metric,
    out_path: P,
    css: (f64, f64),
    ratio: f64,
    renderer: &ChartRenderer,
) -> Result<()> {
    let out_path = out_path.as_ref();
    let format = ChartFormat::from_path(out_path)
        .ok_or_else(|| anyhow!("unsupported chart extension: {}", out_path.display()))?;
    if format == ChartFormat::Png && !FONT_READY.load(Ordering::SeqCst) {
        bail!("PNG output needs a registered font (see register_font_file)");
    }
    let spec = chart_spec(metric, forecast.values(metric));
    let size = backing_size(css, ratio);

    match format {
        ChartFormat::Svg => {
            let mut s = PlottersSurface::new(SVGBackend::new(out_path, size), css, ratio);
            renderer.render(Some(&mut s), forecast.series(metric), &spec)?;
            s.present()?;
        }
        ChartFormat::Png => {
            let mut s = PlottersSurface::new(BitMapBackend::new(out_path, size), css, ratio);
            renderer.render(Some(&mut s), forecast.series(metric), &spec)?;
            s.present()?;
        }
    }
    Ok(())
}

/// Render all four metrics into `<dir>/<slug>_<metric>.<ext>`. Returns the written paths.
pub fn plot_forecast<P: AsRef<Path>>(
    forecast: &Forecast,
    slug: &str,
    out_dir: P,
    format: ChartFormat,
    css: (f64, f64),
    ratio: f64,
    renderer: &ChartRenderer,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let path = out_dir.join(format!("{}_{}.{}", slug, metric.key(), format.extension()));
        plot_metric(forecast, metric, &path, css, ratio, renderer)
            .with_context(|| format!("render {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Render one metric into an in-memory SVG document.
pub fn render_svg_string(
    forecast: &Forecast,
    metric: Metric,
    css: (f64, f64),
    ratio: f64,
    renderer: &ChartRenderer,
) -> Result<String> {
    let spec = chart_spec(metric, forecast.values(metric));
    let mut buf = String::new();
    {
        let backend = SVGBackend::with_string(&mut buf, backing_size(css, ratio));
        let mut s = PlottersSurface::new(backend, css, ratio);
        renderer.render(Some(&mut s), forecast.series(metric), &spec)?;
        s.present()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_count_is_bounded_by_width() {
        assert_eq!(x_label_indices(200, 400.0), vec![0, 50, 100, 150]);
        assert_eq!(x_label_indices(10, 50.0).len(), 3);
        assert!(x_label_indices(0, 400.0).is_empty());
        assert_eq!(x_label_indices(2, 900.0), vec![0, 1]);
    }

    #[test]
    fn plot_rect_applies_padding() {
        let r = plot_rect((450.0, 200.0), (0.0, 1.0));
        assert_eq!((r.x, r.y, r.w, r.h), (42.0, 8.0, 400.0, 162.0));
        let tiny = plot_rect((10.0, 10.0), (0.0, 1.0));
        assert_eq!((tiny.w, tiny.h), (0.0, 0.0));
    }

    #[test]
    fn junk_font_file_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut f, b"definitely not a truetype font").unwrap();
        assert!(register_font_file(f.path()).is_err());
        assert!(!FONT_READY.load(Ordering::SeqCst));
        assert!(register_font_file(Path::new("/nonexistent/font.ttf")).is_err());
    }

    #[test]
    fn utc_offset_hours_out_of_range_falls_back() {
        assert_eq!(ChartRenderer::with_utc_offset_hours(-6).label_offset().local_minus_utc(), -21600);
        assert_eq!(ChartRenderer::with_utc_offset_hours(99).label_offset().local_minus_utc(), 0);
    }
}
