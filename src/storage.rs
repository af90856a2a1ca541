use crate::models::Forecast;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Spreadsheet apps evaluate cells starting with these as formulas.
fn sanitize_cell(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

fn opt(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// CSV cell for sample `i`, `None` when missing or out of range.
fn cell(series: &[f64], i: usize) -> Option<f64> {
    series.get(i).copied().and_then(opt)
}

/// Write to a sibling temp file and rename into place, so readers never see a partial file.
fn write_atomic<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;
    Ok(())
}

/// Save a forecast as CSV with header, one row per time step.
/// Missing samples are written as empty cells.
pub fn save_csv<P: AsRef<Path>>(forecast: &Forecast, path: P) -> Result<()> {
    write_atomic(path, |tmp| {
        let mut wtr = WriterBuilder::new().from_writer(tmp.as_file_mut());
        wtr.serialize(("city", "lat", "lon", "timestamp", "temp", "precip", "wind", "rh"))?;
        let city = sanitize_cell(&forecast.city);
        for (i, ts) in forecast.timestamps.iter().enumerate() {
            wtr.serialize((
                &city,
                forecast.lat,
                forecast.lon,
                ts.to_rfc3339(),
                cell(&forecast.temp, i),
                cell(&forecast.precip, i),
                cell(&forecast.wind, i),
                cell(&forecast.rh, i),
            ))?;
        }
        wtr.flush()?;
        Ok(())
    })
}

/// Save a forecast as pretty JSON in the payload layout, so it can be read back
/// by [`crate::api::DirSource`]. Missing samples become `null`.
pub fn save_json<P: AsRef<Path>>(forecast: &Forecast, path: P) -> Result<()> {
    let series = |v: &[f64]| v.iter().map(|&x| opt(x)).collect::<Vec<_>>();
    let doc = serde_json::json!({
        "city": forecast.city,
        "lat": forecast.lat,
        "lon": forecast.lon,
        "timestamps": forecast.timestamps.iter().map(|t| t.to_rfc3339()).collect::<Vec<_>>(),
        "temp": series(&forecast.temp),
        "precip": series(&forecast.precip),
        "wind": series(&forecast.wind),
        "rh": series(&forecast.rh),
    });
    write_atomic(path, |tmp| {
        let s = serde_json::to_string_pretty(&doc)?;
        tmp.write_all(s.as_bytes())?;
        Ok(())
    })
}
