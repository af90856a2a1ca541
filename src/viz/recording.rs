//! A surface that records every call instead of drawing.
//!
//! Useful for tests and for comparing two renders for equality.

use super::surface::{LabelStyle, Rect, RenderError, Surface, Transform};
use super::types::Rgb8;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BackingSize(u32, u32),
    SetTransform(Transform),
    ClearRect(Rect),
    FillRect(Rect, Rgb8),
    StrokeRect(Rect, Rgb8, f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke(Rgb8, f64),
    FillText {
        text: String,
        x: f64,
        y: f64,
        style: LabelStyle,
    },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    css: (f64, f64),
    ratio: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_ratio(width, height, 1.0)
    }

    pub fn with_ratio(width: f64, height: f64, ratio: f64) -> Self {
        Self {
            css: (width, height),
            ratio,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Change the CSS size, as a host would on resize.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.css = (width, height);
    }

    /// Texts drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn css_size(&self) -> (f64, f64) {
        self.css
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn set_backing_size(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.ops.push(DrawOp::BackingSize(width, height));
        Ok(())
    }

    fn set_transform(&mut self, transform: Transform) -> Result<(), RenderError> {
        self.ops.push(DrawOp::SetTransform(transform));
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) -> Result<(), RenderError> {
        self.ops.push(DrawOp::ClearRect(rect));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb8) -> Result<(), RenderError> {
        self.ops.push(DrawOp::FillRect(rect, color));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb8, width: f64) -> Result<(), RenderError> {
        self.ops.push(DrawOp::StrokeRect(rect, color, width));
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::LineTo(x, y));
    }

    fn stroke(&mut self, color: Rgb8, width: f64) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Stroke(color, width));
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &LabelStyle) -> Result<(), RenderError> {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
        Ok(())
    }
}
