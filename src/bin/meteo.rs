use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use meteo_rs::viz::{self, ChartFormat};
use meteo_rs::{Client, DirSource, ForecastSource, PanelConfig, PanelController};
use meteo_rs::{link, stats, storage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "meteo",
    version,
    about = "Fetch, chart & export point forecasts (meteograms)"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Config file (JSON). Defaults to <config dir>/meteo-rs/config.json when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the forecast host (e.g. https://example.org/wrf).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Read cities.json and <model>/<slug>.json from a local directory instead of HTTP.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Forecast model id.
    #[arg(long, global = true)]
    model: Option<String>,
    /// TrueType font for PNG output.
    #[arg(long, global = true)]
    font: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known cities (falls back to the built-in list when the manifest is unavailable).
    Cities,
    /// Load one city and write its four charts (and optionally export/print stats).
    Render(RenderArgs),
    /// Print the shareable deep link for a city.
    Link {
        /// City slug.
        city: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Svg,
    Png,
}

impl From<OutFormat> for ChartFormat {
    fn from(f: OutFormat) -> Self {
        match f {
            OutFormat::Svg => ChartFormat::Svg,
            OutFormat::Png => ChartFormat::Png,
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// City slug; defaults to the first city in the manifest.
    #[arg(short, long)]
    city: Option<String>,
    /// Directory for `<slug>_<metric>.<ext>` chart files.
    #[arg(short, long, default_value = "charts")]
    out_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = OutFormat::Svg)]
    format: OutFormat,
    /// Chart width in CSS pixels (default from config).
    #[arg(long)]
    width: Option<f64>,
    /// Chart height in CSS pixels (default from config).
    #[arg(long)]
    height: Option<f64>,
    /// Device pixel ratio (default from config).
    #[arg(long)]
    pixel_ratio: Option<f64>,
    /// Whole-hour UTC offset for time labels.
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,
    /// Seconds to wait for the forecast.
    #[arg(long, default_value_t = 60)]
    wait_secs: u64,
    /// Print per-metric statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Save the normalized forecast (.csv or .json).
    #[arg(long)]
    export: Option<PathBuf>,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.2}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn load_config(args: &SourceArgs) -> Result<PanelConfig> {
    let mut config = PanelConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(font) = &args.font {
        config.font_path = Some(font.clone());
    }
    Ok(config)
}

fn make_source(args: &SourceArgs, config: &PanelConfig) -> Result<Arc<dyn ForecastSource>> {
    Ok(match &args.data_dir {
        Some(dir) => Arc::new(DirSource::new(dir, &config.model)),
        None => Arc::new(Client::new(config)?),
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let mut config = load_config(&cli.source)?;
    match cli.cmd {
        Command::Cities => cmd_cities(&cli.source, &config),
        Command::Render(args) => {
            if let Some(hours) = args.utc_offset {
                config.label_utc_offset_hours = hours;
            }
            cmd_render(&cli.source, &config, args)
        }
        Command::Link { city } => {
            println!("{}", link::deep_link(&config.model, &city));
            Ok(())
        }
    }
}

fn cmd_cities(source: &SourceArgs, config: &PanelConfig) -> Result<()> {
    let mut panel = PanelController::new(make_source(source, config)?, config);
    for c in panel.ensure_cities() {
        println!("{:<24} {:<32} {:>8.3} {:>9.3}", c.slug, c.name, c.lat, c.lon);
    }
    Ok(())
}

fn cmd_render(source: &SourceArgs, config: &PanelConfig, args: RenderArgs) -> Result<()> {
    let format = ChartFormat::from(args.format);
    if let Some(font) = &config.font_path {
        viz::register_font_file(font)?;
    }

    let mut panel = PanelController::new(make_source(source, config)?, config);
    panel.open(args.city.as_deref());
    let slug = panel
        .selected_slug()
        .map(str::to_string)
        .context("no city selected")?;
    let forecast = panel
        .wait(Duration::from_secs(args.wait_secs))
        .with_context(|| format!("load forecast for {slug}"))?
        .clone();

    if let Some(header) = panel.header() {
        eprintln!("{}  [{}]  {}", header.title, header.meta, header.range);
    }

    let css = (
        args.width.unwrap_or(config.chart_width),
        args.height.unwrap_or(config.chart_height),
    );
    let ratio = args.pixel_ratio.unwrap_or(config.pixel_ratio);
    let written = viz::plot_forecast(
        &forecast,
        &slug,
        &args.out_dir,
        format,
        css,
        ratio,
        panel.renderer(),
    )?;
    for p in &written {
        eprintln!("Wrote chart to {}", p.display());
    }

    if let Some(path) = args.export.as_ref() {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => storage::save_csv(&forecast, path)?,
            "json" => storage::save_json(&forecast, path)?,
            other => anyhow::bail!("unsupported export format: {}", other),
        }
        eprintln!("Saved {} steps to {}", forecast.len(), path.display());
    }

    if args.stats {
        for s in stats::forecast_summary(&forecast) {
            println!(
                "{} | {:<18} count={} missing={}  min={} max={} mean={} median={} {}",
                forecast.city,
                s.metric.label(),
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median),
                s.unit
            );
        }
        println!("precipitation total = {} mm", fmt_opt(Some(stats::precip_total(&forecast))));
    }

    Ok(())
}
