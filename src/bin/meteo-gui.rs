/*!
 * Desktop meteogram panel for meteo-rs
 *
 * Pick a city, open the panel and the four charts (temperature, precipitation,
 * wind, relative humidity) are drawn straight into the window. Loads run in the
 * background; switching cities quickly never shows an outdated forecast.
 *
 * An optional first argument is read as a page query string, e.g. `?city=veracruz`.
 */

use eframe::egui;
use meteo_rs::models::Metric;
use meteo_rs::viz::surface::PathBuilder;
use meteo_rs::viz::{LabelStyle, Rect, RenderError, Rgb8, Surface, TextAlign, TextBaseline, Transform};
use meteo_rs::{Client, ForecastSource, PanelConfig, PanelController, PanelState};
use std::sync::Arc;
use std::time::Duration;

const CHART_HEIGHT: f32 = 220.0;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = PanelConfig::load(None).unwrap_or_else(|e| {
        log::warn!("{e}; using default config");
        PanelConfig::default()
    });
    let query = std::env::args().nth(1).unwrap_or_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 1040.0])
            .with_min_inner_size([360.0, 400.0])
            .with_title("Meteogram - meteo-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "Meteogram",
        options,
        Box::new(move |_cc| Ok(Box::new(MeteoApp::new(config, &query)))),
    )
}

/// Draws renderer output with an egui painter. egui scales to physical pixels
/// itself, so the surface reports ratio 1 and only translates into its rect.
struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    css: (f64, f64),
    transform: Transform,
    path: PathBuilder,
}

impl<'a> EguiSurface<'a> {
    fn new(painter: &'a egui::Painter, rect: egui::Rect) -> Self {
        Self {
            painter,
            origin: rect.min,
            css: (rect.width() as f64, rect.height() as f64),
            transform: Transform::IDENTITY,
            path: PathBuilder::default(),
        }
    }

    fn pos(&self, x: f64, y: f64) -> egui::Pos2 {
        let (x, y) = self.transform.apply(x, y);
        self.origin + egui::vec2(x as f32, y as f32)
    }

    fn rect(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_two_pos(self.pos(r.x, r.y), self.pos(r.x + r.w, r.y + r.h))
    }
}

/// Chart area text while there is nothing to draw.
fn placeholder(loading: bool) -> &'static str {
    if loading {
        "Loading…"
    } else {
        "No forecast loaded. Choose a city or reload."
    }
}

fn color(c: Rgb8) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

impl Surface for EguiSurface<'_> {
    fn css_size(&self) -> (f64, f64) {
        self.css
    }

    fn set_backing_size(&mut self, _width: u32, _height: u32) -> Result<(), RenderError> {
        Ok(())
    }

    fn set_transform(&mut self, transform: Transform) -> Result<(), RenderError> {
        self.transform = transform;
        Ok(())
    }

    // Every frame starts from an empty layer.
    fn clear_rect(&mut self, _rect: Rect) -> Result<(), RenderError> {
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, c: Rgb8) -> Result<(), RenderError> {
        self.painter.rect_filled(self.rect(rect), 0.0, color(c));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, c: Rgb8, width: f64) -> Result<(), RenderError> {
        self.painter
            .rect_stroke(self.rect(rect), 0.0, egui::Stroke::new(width as f32, color(c)));
        Ok(())
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

    fn stroke(&mut self, c: Rgb8, width: f64) -> Result<(), RenderError> {
        let stroke = egui::Stroke::new(width as f32, color(c));
        for sp in self.path.subpaths() {
            if sp.len() < 2 {
                continue;
            }
            let points: Vec<egui::Pos2> = sp.iter().map(|&(x, y)| self.pos(x, y)).collect();
            self.painter.add(egui::Shape::line(points, stroke));
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &LabelStyle) -> Result<(), RenderError> {
        let h = match style.align {
            TextAlign::Left => egui::Align::Min,
            TextAlign::Center => egui::Align::Center,
            TextAlign::Right => egui::Align::Max,
        };
        let v = match style.baseline {
            TextBaseline::Top => egui::Align::Min,
            TextBaseline::Middle => egui::Align::Center,
            TextBaseline::Bottom => egui::Align::Max,
        };
        self.painter.text(
            self.pos(x, y),
            egui::Align2([h, v]),
            text,
            egui::FontId::proportional(style.font_px as f32),
            color(style.color),
        );
        Ok(())
    }
}

struct MeteoApp {
    panel: PanelController,
    status_message: String,
    error_message: String,
}

impl MeteoApp {
    fn new(config: PanelConfig, query: &str) -> Self {
        let source: Arc<dyn ForecastSource> = match Client::new(&config) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                log::error!("HTTP client unavailable: {e}");
                Arc::new(meteo_rs::DirSource::new(".", &config.model))
            }
        };
        let mut panel = PanelController::new(source, &config).with_query(query);
        panel.ensure_cities();
        Self {
            panel,
            status_message: String::new(),
            error_message: String::new(),
        }
    }

    fn check_loads(&mut self) {
        match self.panel.poll() {
            Ok(true) => {
                self.error_message.clear();
                self.status_message = self
                    .panel
                    .header()
                    .map(|h| format!("Loaded {}", h.title))
                    .unwrap_or_default();
            }
            Ok(false) => {}
            Err(e) => {
                self.status_message.clear();
                self.error_message = format!("Could not load the forecast: {e}");
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let cities = self.panel.cities().to_vec();
        let current = self.panel.selected_slug().map(str::to_string);
        let shown = current
            .as_deref()
            .map(|s| meteo_rs::cities::display_name(&cities, s))
            .unwrap_or_else(|| "Select a city".to_string());

        ui.horizontal(|ui| {
            ui.label("City:");
            let mut picked = current.clone();
            egui::ComboBox::from_id_salt("city")
                .selected_text(shown)
                .show_ui(ui, |ui| {
                    for c in &cities {
                        ui.selectable_value(&mut picked, Some(c.slug.clone()), &c.name);
                    }
                });
            if picked != current
                && let Some(slug) = picked
            {
                self.panel.select_city(&slug);
            }

            match self.panel.state() {
                PanelState::Closed => {
                    if ui.button("Open meteogram").clicked() {
                        self.panel.open(None);
                    }
                }
                PanelState::Open => {
                    if ui.button("Reload").clicked() {
                        self.panel.reload();
                    }
                    if ui.button("Close").clicked() {
                        self.panel.close();
                    }
                }
            }
            if self.panel.is_loading() {
                ui.spinner();
            }
        });

        if let Some(link) = self.panel.deep_link() {
            ui.horizontal(|ui| {
                ui.label("Link:");
                ui.monospace(link);
            });
        }
    }

    fn charts(&mut self, ui: &mut egui::Ui) {
        let Some(header) = self.panel.header().cloned() else {
            ui.label(placeholder(self.panel.is_loading()));
            return;
        };
        ui.heading(&header.title);
        ui.label(format!("{}  ·  {}", header.meta, header.range));
        ui.add_space(6.0);

        for metric in Metric::ALL {
            ui.label(format!("{} ({})", metric.label(), metric.unit()));
            let width = ui.available_width();
            let (response, painter) =
                ui.allocate_painter(egui::vec2(width, CHART_HEIGHT), egui::Sense::hover());
            let mut surface = EguiSurface::new(&painter, response.rect);
            if let Err(e) = self.panel.render_metric(metric, Some(&mut surface)) {
                self.error_message = format!("Chart error: {e}");
            }
            ui.add_space(8.0);
        }
    }
}

impl eframe::App for MeteoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_loads();
        if self.panel.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            self.controls(ui);
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.panel.is_open() {
                    // egui lays out every frame, so a window resize redraws from the last dataset.
                    self.charts(ui);
                } else {
                    ui.label("Choose a city and open the meteogram.");
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::placeholder;

    #[test]
    fn failed_load_does_not_show_loading() {
        assert_eq!(placeholder(true), "Loading…");
        assert!(!placeholder(false).contains("Loading"));
    }
}
