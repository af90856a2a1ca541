//! Public types and constants for the visualization module.

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Polyline through every sample.
    Line,
    /// One bar per sample, rising from the bottom of the plot area.
    Bar,
}

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Per-metric display options supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Suffix for value-axis labels (`"°C"`, `"mm"`, ...).
    pub unit: String,
    pub kind: SeriesKind,
    pub color: Rgb8,
    /// Fixed value range; `None` means auto-scale from the data.
    pub lock: Option<(f64, f64)>,
}

impl ChartSpec {
    pub fn new(unit: &str, kind: SeriesKind, color: Rgb8) -> Self {
        Self {
            unit: unit.to_string(),
            kind,
            color,
            lock: None,
        }
    }

    pub fn locked(mut self, min: f64, max: f64) -> Self {
        self.lock = Some((min, max));
        self
    }
}

/// Space reserved around the plot area for axis labels, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

pub const PADDING: Padding = Padding {
    left: 42.0,
    right: 8.0,
    top: 8.0,
    bottom: 30.0,
};

/// Horizontal space one X label needs; bounds the label count.
pub const X_LABEL_SPACING_PX: f64 = 90.0;
/// Never fewer than this many X labels (when there is data to label).
pub const MIN_X_LABELS: usize = 3;
/// Gap between neighbouring bars.
pub const BAR_GAP_PX: f64 = 2.0;
pub const LINE_WIDTH_PX: f64 = 2.0;
pub const LABEL_FONT_PX: f64 = 11.0;
