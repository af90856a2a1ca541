//! The drawing-surface contract the renderer draws against.
//!
//! A surface is a 2D immediate-mode context in the spirit of an HTML canvas:
//! rectangles, a single current path, aligned text, and a settable transform.
//! Coordinates handed to a surface are CSS pixels; the transform maps them to
//! backing pixels.

use super::types::Rgb8;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing backend error: {0}")]
    Backend(String),
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Affine transform restricted to scale + translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn scale(factor: f64) -> Self {
        Self {
            sx: factor,
            sy: factor,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.sx + self.tx, y * self.sy + self.ty)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font_px: f64,
    pub color: Rgb8,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// 2D immediate-mode drawing context.
pub trait Surface {
    /// Layout size in CSS pixels.
    fn css_size(&self) -> (f64, f64);

    /// Backing pixels per CSS pixel.
    fn pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Size the backing pixel buffer. Fixed-size backends may only verify the request.
    fn set_backing_size(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Transform) -> Result<(), RenderError>;

    fn clear_rect(&mut self, rect: Rect) -> Result<(), RenderError>;

    fn fill_rect(&mut self, rect: Rect, color: Rgb8) -> Result<(), RenderError>;

    fn stroke_rect(&mut self, rect: Rect, color: Rgb8, width: f64) -> Result<(), RenderError>;

    /// Discard the current path.
    fn begin_path(&mut self);

    /// Start a new sub-path at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64);

    /// Extend the current sub-path to `(x, y)`.
    fn line_to(&mut self, x: f64, y: f64);

    /// Stroke every sub-path of the current path.
    fn stroke(&mut self, color: Rgb8, width: f64) -> Result<(), RenderError>;

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &LabelStyle) -> Result<(), RenderError>;
}

/// Backing buffer size for a CSS size and pixel ratio.
pub fn backing_size(css: (f64, f64), ratio: f64) -> (u32, u32) {
    let ratio = effective_ratio(ratio);
    let px = |v: f64| (v.max(0.0) * ratio).round() as u32;
    (px(css.0), px(css.1))
}

/// Non-finite or non-positive ratios count as 1.
pub fn effective_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

/// Sub-paths collected between `begin_path` and `stroke`, for backends
/// without a native path API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathBuilder {
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl PathBuilder {
    pub fn clear(&mut self) {
        self.subpaths.clear();
    }

    pub fn move_to(&mut self, p: (f64, f64)) {
        self.subpaths.push(vec![p]);
    }

    pub fn line_to(&mut self, p: (f64, f64)) {
        match self.subpaths.last_mut() {
            Some(sp) => sp.push(p),
            // canvas semantics: lineTo on an empty path acts as moveTo
            None => self.subpaths.push(vec![p]),
        }
    }

    pub fn subpaths(&self) -> impl Iterator<Item = &[(f64, f64)]> {
        self.subpaths.iter().map(Vec::as_slice)
    }
}
