//! The meteogram panel: city selection, generation-guarded loads and redraws.
//!
//! A [`PanelController`] is owned by its host (CLI, GUI, tests). Loads run on a
//! background thread and report back over a channel; the host calls
//! [`PanelController::poll`] (non-blocking) or [`PanelController::wait`] (blocking)
//! to pick up results. Every load gets a new generation number and results from
//! older generations are discarded, so a slow response for a previous city can
//! never replace the current one.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use meteo_rs::api::Client;
//! # use meteo_rs::config::PanelConfig;
//! # use meteo_rs::panel::PanelController;
//! # use meteo_rs::viz::recording::RecordingSurface;
//! let config = PanelConfig::default();
//! let mut panel = PanelController::new(Arc::new(Client::new(&config)?), &config);
//! panel.open(Some("veracruz"));
//! panel.wait(Duration::from_secs(30))?;
//! let mut surfaces: Vec<RecordingSurface> = (0..4).map(|_| RecordingSurface::new(640.0, 220.0)).collect();
//! let [a, b, c, d] = &mut surfaces[..] else { unreachable!() };
//! panel.render_all([Some(a), Some(b), Some(c), Some(d)])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::api::{FetchError, ForecastSource};
use crate::cities;
use crate::config::PanelConfig;
use crate::link;
use crate::models::{City, Forecast, Metric};
use crate::normalize::normalize;
use crate::viz::text::format_time_range;
use crate::viz::util::chart_spec;
use crate::viz::{ChartRenderer, RenderError, Surface};
use serde_json::Value;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("load {slug}: {source}")]
    Fetch {
        slug: String,
        #[source]
        source: FetchError,
    },
    #[error("timed out waiting for {slug}")]
    Timeout { slug: String },
    #[error("no load in progress")]
    Idle,
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open,
}

/// Display text for the panel heading.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelHeader {
    pub title: String,
    /// Coordinates and model id.
    pub meta: String,
    /// First and last forecast time.
    pub range: String,
}

#[derive(Debug)]
struct LoadMessage {
    generation: u64,
    slug: String,
    result: Result<Value, FetchError>,
}

#[derive(Debug, Clone)]
struct Pending {
    generation: u64,
    slug: String,
}

#[derive(Debug, Clone)]
struct Rendered {
    slug: String,
    forecast: Forecast,
    header: PanelHeader,
}

pub struct PanelController {
    source: Arc<dyn ForecastSource>,
    model: String,
    renderer: ChartRenderer,
    state: PanelState,
    cities: Option<Vec<City>>,
    selected: Option<String>,
    generation: u64,
    pending: Option<Pending>,
    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
    last: Option<Rendered>,
}

impl std::fmt::Debug for PanelController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelController")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("selected", &self.selected)
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .field("last", &self.last.as_ref().map(|r| &r.slug))
            .finish_non_exhaustive()
    }
}

impl PanelController {
    pub fn new(source: Arc<dyn ForecastSource>, config: &PanelConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            model: config.model.clone(),
            renderer: ChartRenderer::with_utc_offset_hours(config.label_utc_offset_hours),
            state: PanelState::Closed,
            cities: None,
            selected: None,
            generation: 0,
            pending: None,
            tx,
            rx,
            last: None,
        }
    }

    /// Restore the selection persisted in a page query string (`?city=<slug>`).
    pub fn with_query(mut self, query: &str) -> Self {
        if let Some(slug) = link::city_from_query(query) {
            self.selected = Some(slug);
        }
        self
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    pub fn renderer(&self) -> &ChartRenderer {
        &self.renderer
    }

    /// Loaded city list; empty until the panel has been opened once.
    pub fn cities(&self) -> &[City] {
        self.cities.as_deref().unwrap_or(&[])
    }

    /// Load the city list unless already loaded. A failed or empty manifest
    /// falls back to the built-in list.
    pub fn ensure_cities(&mut self) -> &[City] {
        if self.cities.is_none() {
            let list = match self.source.fetch_cities() {
                Ok(list) if !list.is_empty() => {
                    log::info!("loaded {} cities", list.len());
                    list
                }
                Ok(_) => {
                    log::warn!("city manifest is empty; using fallback list");
                    cities::fallback_cities()
                }
                Err(e) => {
                    log::warn!("city manifest unavailable ({e}); using fallback list");
                    cities::fallback_cities()
                }
            };
            self.cities = Some(list);
        }
        self.cities()
    }

    /// Slug shown in the city selector.
    pub fn selected_slug(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Open the panel and start loading `slug` (or the current/persisted selection,
    /// or the first known city). Returns the generation of the started load.
    pub fn open(&mut self, slug: Option<&str>) -> u64 {
        self.state = PanelState::Open;
        self.ensure_cities();
        let target = self.resolve_slug(slug);
        self.selected = Some(target.clone());
        self.start_load(target)
    }

    /// Hide the panel. The last dataset stays available for the next open/redraw.
    pub fn close(&mut self) {
        self.state = PanelState::Closed;
    }

    /// Change the selection; loads immediately while open.
    pub fn select_city(&mut self, slug: &str) -> Option<u64> {
        self.selected = Some(slug.to_string());
        if self.is_open() {
            Some(self.start_load(slug.to_string()))
        } else {
            None
        }
    }

    /// Fetch the current selection again, bypassing caches.
    pub fn reload(&mut self) -> Option<u64> {
        if !self.is_open() {
            return None;
        }
        let slug = self.selected.clone()?;
        Some(self.start_load(slug))
    }

    fn resolve_slug(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.selected.clone())
            .unwrap_or_else(|| cities::resolve(self.cities(), "").slug)
    }

    fn start_load(&mut self, slug: String) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        if let Some(prev) = self.pending.replace(Pending {
            generation,
            slug: slug.clone(),
        }) {
            log::debug!("load {} ({}) superseded by {}", prev.generation, prev.slug, generation);
        }
        log::debug!("load {generation}: fetching {slug}");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.fetch_forecast(&slug);
            // The controller may be gone; nothing to report to then.
            let _ = tx.send(LoadMessage {
                generation,
                slug,
                result,
            });
        });
        generation
    }

    /// Pick up finished loads without blocking.
    ///
    /// Returns `Ok(true)` when a new dataset became "last rendered", and the fetch
    /// error when the current load failed. Stale results are dropped.
    pub fn poll(&mut self) -> Result<bool, PanelError> {
        let mut updated = false;
        while let Ok(msg) = self.rx.try_recv() {
            match self.accept(msg) {
                Some(Ok(())) => updated = true,
                Some(Err(e)) => return Err(e),
                None => {}
            }
        }
        Ok(updated)
    }

    /// Block until the current load finishes (or `timeout` passes).
    pub fn wait(&mut self, timeout: Duration) -> Result<&Forecast, PanelError> {
        let Some(pending) = self.pending.clone() else {
            return Err(PanelError::Idle);
        };
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => {
                    if let Some(result) = self.accept(msg) {
                        result?;
                        return self.last_rendered().ok_or(PanelError::Idle);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(PanelError::Timeout { slug: pending.slug });
                }
                // `self.tx` keeps the channel open.
                Err(RecvTimeoutError::Disconnected) => return Err(PanelError::Idle),
            }
        }
    }

    /// Apply one load result. `None` means the result was stale.
    fn accept(&mut self, msg: LoadMessage) -> Option<Result<(), PanelError>> {
        if self.pending.as_ref().map(|p| p.generation) != Some(msg.generation) {
            log::debug!(
                "discarding stale load {} ({}); current generation is {}",
                msg.generation,
                msg.slug,
                self.generation
            );
            return None;
        }
        self.pending = None;
        match msg.result {
            Err(source) => Some(Err(PanelError::Fetch {
                slug: msg.slug,
                source,
            })),
            Ok(raw) => {
                let forecast = normalize(&raw, &msg.slug, self.cities());
                let header = self.header_for(&forecast);
                log::info!(
                    "loaded {} ({} steps) as generation {}",
                    msg.slug,
                    forecast.len(),
                    msg.generation
                );
                self.last = Some(Rendered {
                    slug: msg.slug,
                    forecast,
                    header,
                });
                Some(Ok(()))
            }
        }
    }

    fn header_for(&self, forecast: &Forecast) -> PanelHeader {
        let offset = self.renderer.label_offset();
        PanelHeader {
            title: format!("Meteogram: {}", forecast.city),
            meta: format!("{:.3}, {:.3} · {}", forecast.lat, forecast.lon, self.model),
            range: format_time_range(&forecast.timestamps, &offset)
                .unwrap_or_else(|| "no data".to_string()),
        }
    }

    pub fn last_rendered(&self) -> Option<&Forecast> {
        self.last.as_ref().map(|r| &r.forecast)
    }

    pub fn last_slug(&self) -> Option<&str> {
        self.last.as_ref().map(|r| r.slug.as_str())
    }

    pub fn header(&self) -> Option<&PanelHeader> {
        self.last.as_ref().map(|r| &r.header)
    }

    /// Draw one metric of the last dataset. `Ok(false)` when nothing is loaded.
    pub fn render_metric<S: Surface + ?Sized>(
        &self,
        metric: Metric,
        surface: Option<&mut S>,
    ) -> Result<bool, RenderError> {
        let Some(r) = &self.last else {
            return Ok(false);
        };
        let values = r.forecast.values(metric);
        self.renderer
            .render(surface, r.forecast.series(metric), &chart_spec(metric, values))?;
        Ok(true)
    }

    /// Draw all four metrics (in [`Metric::ALL`] order) of the last dataset.
    pub fn render_all(&self, surfaces: [Option<&mut dyn Surface>; 4]) -> Result<bool, RenderError> {
        if self.last.is_none() {
            return Ok(false);
        }
        for (metric, surface) in Metric::ALL.into_iter().zip(surfaces) {
            self.render_metric(metric, surface)?;
        }
        Ok(true)
    }

    /// Host size changed: redraw the last dataset. Never fetches.
    pub fn on_resize(&self, surfaces: [Option<&mut dyn Surface>; 4]) -> Result<bool, RenderError> {
        self.render_all(surfaces)
    }

    /// Shareable link for the current selection.
    pub fn deep_link(&self) -> Option<String> {
        self.selected
            .as_deref()
            .map(|slug| link::deep_link(&self.model, slug))
    }
}
