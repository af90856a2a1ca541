//! Label formatting and text measurement.

use chrono::{DateTime, FixedOffset, Utc};

/// Heuristic: estimate pixel width of text (no backend offers text measuring here).
pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    (text.chars().count() as f64) * font_px * 0.60
}

/// Largest font size up to `font_px` at which `text` fits into `max_px`.
pub fn fit_font_px(text: &str, font_px: f64, max_px: f64) -> f64 {
    let w = estimate_text_width_px(text, font_px);
    if w <= max_px || w <= 0.0 {
        font_px
    } else {
        (font_px * max_px / w).max(6.0)
    }
}

/// Value-axis label: precision follows the tick step, unit appended.
pub fn format_tick(value: f64, step: f64, unit: &str) -> String {
    let step = step.abs();
    let prec = if !step.is_finite() || step >= 1.0 {
        0
    } else if step >= 0.1 {
        1
    } else {
        2
    };
    let s = format!("{:.*}", prec, value);
    // avoid "-0" style labels
    let s = if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        s.trim_start_matches('-').to_string()
    } else {
        s
    };
    format!("{s}{unit}")
}

/// Time-axis label `DD/MM HHh` in the given offset.
pub fn format_time_label(ts: &DateTime<Utc>, offset: &FixedOffset) -> String {
    ts.with_timezone(offset).format("%d/%m %Hh").to_string()
}

/// `first – last` as time labels, or `None` without timestamps.
pub fn format_time_range(timestamps: &[DateTime<Utc>], offset: &FixedOffset) -> Option<String> {
    let first = timestamps.first()?;
    let last = timestamps.last()?;
    Some(format!(
        "{} – {}",
        format_time_label(first, offset),
        format_time_label(last, offset)
    ))
}
