//! Per-lap splits.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{FieldMapExt, FieldTypeError};

/// One lap's summary, in file (chronological) order.
#[derive(Debug, Clone, Serialize)]
pub struct LapSplit {
    /// 1-based lap number in file order.
    pub lap_number: u32,
    /// Lap distance, meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Lap timer time, seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<f64>,
    /// Lap average speed, m/s, enhanced reading preferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_min_per_km: Option<String>,
}

pub(crate) fn compute(activity: &ParsedActivity) -> Result<Vec<LapSplit>, FieldTypeError> {
    let mut splits = Vec::with_capacity(activity.laps.len());
    for (index, lap) in activity.laps.iter().enumerate() {
        let avg_speed = lap.prefer_enhanced("avg_speed")?;
        let pace = avg_speed
            .filter(|v| *v > 0.0)
            .map(|v| stats::format_pace(1000.0 / (v * 60.0)));

        splits.push(LapSplit {
            lap_number: (index + 1) as u32,
            distance: lap.numeric("total_distance")?,
            time: lap.numeric("total_timer_time")?,
            avg_heart_rate: lap.numeric("avg_heart_rate")?,
            avg_speed,
            avg_cadence: lap.numeric("avg_cadence")?,
            total_ascent: lap.numeric("total_ascent")?,
            total_calories: lap.numeric("total_calories")?,
            pace_min_per_km: pace,
        });
    }
    Ok(splits)
}
