//! meteo_rs
//!
//! Fetch, normalize and chart point forecasts ("meteograms") published as static
//! JSON files by a numerical weather model pipeline. Pairs with the `meteo` CLI and
//! the `meteo-gui` desktop panel.
//!
//! ### Features
//! - City manifest with a built-in fallback list
//! - Tolerant payload normalization (aliases, string coordinates, ragged series)
//! - Four charts per city: temperature, precipitation, wind and relative humidity
//! - Renderer drawing through a small [`viz::Surface`] trait (SVG/PNG via plotters, egui, recording)
//! - Panel controller that discards out-of-order responses
//! - CSV/JSON export and quick summary statistics
//!
//! ### Example
//! ```no_run
//! use meteo_rs::{Client, ForecastSource, PanelConfig};
//! use meteo_rs::viz::{ChartFormat, ChartRenderer};
//!
//! let config = PanelConfig::default();
//! let client = Client::new(&config)?;
//! let cities = client.fetch_cities()?;
//! let raw = client.fetch_forecast("veracruz")?;
//! let forecast = meteo_rs::normalize::normalize(&raw, "veracruz", &cities);
//! meteo_rs::viz::plot_forecast(
//!     &forecast,
//!     "veracruz",
//!     "charts",
//!     ChartFormat::Svg,
//!     config.css_size(),
//!     config.pixel_ratio,
//!     &ChartRenderer::default(),
//! )?;
//! meteo_rs::storage::save_csv(&forecast, "veracruz.csv")?;
//! println!("{:#?}", meteo_rs::stats::forecast_summary(&forecast));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cities;
pub mod config;
pub mod link;
pub mod models;
pub mod normalize;
pub mod panel;
pub mod scale;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Client, DirSource, FetchError, ForecastSource};
pub use config::PanelConfig;
pub use models::{City, DrawRect, Forecast, Metric, SeriesView};
pub use panel::{PanelController, PanelError, PanelState};
