//! Statistical and formatting helpers shared by the metrics sections.
//!
//! All helpers operate on plain `f64` slices: callers resolve fields to
//! numeric series first, so type questions never reach this layer.

/// Arithmetic mean. `None` for an empty series.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the two middle values for even-length series).
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation. 0.0 for series shorter than two samples.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Round to `decimals` decimal places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Consistency score (0-100): 100 minus the coefficient of variation.
///
/// Degenerate series (fewer than two samples, or zero mean) are defined as
/// maximally consistent.
pub(crate) fn consistency_score(values: &[f64]) -> f64 {
    let avg = match mean(values) {
        Some(avg) if values.len() >= 2 => avg,
        _ => return 100.0,
    };
    if avg == 0.0 {
        return 100.0;
    }
    let cv = (std_dev(values) / avg) * 100.0;
    round_to((100.0 - cv).clamp(0.0, 100.0), 2)
}

/// Format a duration in seconds as `HH:MM:SS`.
pub(crate) fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Format a pace in decimal minutes as `MM:SS`, carrying a rounded 60s
/// remainder into the minute.
pub(crate) fn format_pace(pace_minutes: f64) -> String {
    let mut minutes = pace_minutes.floor() as u64;
    let mut seconds = ((pace_minutes - pace_minutes.floor()) * 60.0).round() as u64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{:02}:{:02}", minutes, seconds)
}
