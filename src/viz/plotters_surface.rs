//! [`Surface`] implementation on top of any Plotters drawing backend (SVG, bitmap, ...).
//!
//! ```no_run
//! use meteo_rs::viz::plotters_surface::PlottersSurface;
//! use meteo_rs::viz::surface::backing_size;
//! use plotters_svg::SVGBackend;
//!
//! let css = (640.0, 220.0);
//! let ratio = 2.0;
//! let backend = SVGBackend::new("temp.svg", backing_size(css, ratio));
//! let mut surface = PlottersSurface::new(backend, css, ratio);
//! // renderer.render(Some(&mut surface), series, &spec)?;
//! surface.present()?;
//! # Ok::<(), meteo_rs::viz::surface::RenderError>(())
//! ```

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::surface::{
    LabelStyle, PathBuilder, Rect, RenderError, Surface, TextAlign, TextBaseline, Transform,
    backing_size,
};
use super::types::Rgb8;

pub fn rgb_color(c: Rgb8) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Build a ShapeStyle for line strokes; widths are in backing pixels.
pub fn line_style(c: Rgb8, width_px: f64) -> ShapeStyle {
    rgb_color(c).stroke_width(width_px.round().max(1.0) as u32)
}

/// Build a filled style for bars and backgrounds.
pub fn fill_style(c: Rgb8) -> ShapeStyle {
    rgb_color(c).filled()
}

fn backend_err<E: std::fmt::Debug>(e: E) -> RenderError {
    RenderError::Backend(format!("{e:?}"))
}

pub struct PlottersSurface<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    css: (f64, f64),
    ratio: f64,
    transform: Transform,
    path: PathBuilder,
}

impl<DB: DrawingBackend> PlottersSurface<DB> {
    /// Wrap `backend`, which should already be sized with [`backing_size`]`(css, ratio)`.
    pub fn new(backend: DB, css: (f64, f64), ratio: f64) -> Self {
        Self {
            area: backend.into_drawing_area(),
            css,
            ratio,
            transform: Transform::IDENTITY,
            path: PathBuilder::default(),
        }
    }

    /// Flush pending output (writes the file for file-backed backends).
    pub fn present(&self) -> Result<(), RenderError> {
        self.area.present().map_err(backend_err)
    }

    fn px(&self, x: f64, y: f64) -> (i32, i32) {
        let (dx, dy) = self.transform.apply(x, y);
        (dx.round() as i32, dy.round() as i32)
    }

    fn corners(&self, r: Rect) -> [(i32, i32); 2] {
        [self.px(r.x, r.y), self.px(r.x + r.w, r.y + r.h)]
    }

    fn device_width(&self, width: f64) -> f64 {
        width * self.transform.sx.abs()
    }
}

impl<DB: DrawingBackend> Surface for PlottersSurface<DB> {
    fn css_size(&self) -> (f64, f64) {
        self.css
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn set_backing_size(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let actual = self.area.dim_in_pixel();
        if actual != (width, height) {
            // Plotters backends are created with a fixed size.
            log::debug!(
                "backing size request {width}x{height} differs from backend {}x{} (expected {:?})",
                actual.0,
                actual.1,
                backing_size(self.css, self.ratio)
            );
        }
        Ok(())
    }

    fn set_transform(&mut self, transform: Transform) -> Result<(), RenderError> {
        self.transform = transform;
        Ok(())
    }

    fn clear_rect(&mut self, rect: Rect) -> Result<(), RenderError> {
        self.area
            .draw(&Rectangle::new(self.corners(rect), WHITE.filled()))
            .map_err(backend_err)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb8) -> Result<(), RenderError> {
        self.area
            .draw(&Rectangle::new(self.corners(rect), fill_style(color)))
            .map_err(backend_err)
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb8, width: f64) -> Result<(), RenderError> {
        let style = line_style(color, self.device_width(width));
        self.area
            .draw(&Rectangle::new(self.corners(rect), style))
            .map_err(backend_err)
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to((x, y));
    }

    fn stroke(&mut self, color: Rgb8, width: f64) -> Result<(), RenderError> {
        let style = line_style(color, self.device_width(width));
        for sub in self.path.subpaths() {
            if sub.len() < 2 {
                continue;
            }
            let points: Vec<(i32, i32)> = sub.iter().map(|&(x, y)| self.px(x, y)).collect();
            self.area
                .draw(&PathElement::new(points, style))
                .map_err(backend_err)?;
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &LabelStyle) -> Result<(), RenderError> {
        let h = match style.align {
            TextAlign::Left => HPos::Left,
            TextAlign::Center => HPos::Center,
            TextAlign::Right => HPos::Right,
        };
        let v = match style.baseline {
            TextBaseline::Top => VPos::Top,
            TextBaseline::Middle => VPos::Center,
            TextBaseline::Bottom => VPos::Bottom,
        };
        let font_px = style.font_px * self.transform.sy.abs();
        let text_style = (FontFamily::SansSerif, font_px)
            .into_font()
            .color(&rgb_color(style.color))
            .pos(Pos::new(h, v));
        self.area
            .draw(&Text::new(text.to_string(), self.px(x, y), text_style))
            .map_err(backend_err)
    }
}
