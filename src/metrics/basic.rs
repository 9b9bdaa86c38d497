//! Basic activity statistics from the authoritative session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{FieldMapExt, FieldTypeError};

const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Serialize)]
pub struct BasicStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_descent: Option<f64>,
}

pub(crate) fn compute(activity: &ParsedActivity) -> Result<Option<BasicStats>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let duration = session.numeric("total_timer_time")?;
    let distance = session.numeric("total_distance")?;

    Ok(Some(BasicStats {
        sport: session.text("sport"),
        sub_sport: session.text("sub_sport"),
        start_time: session.timestamp("start_time"),
        duration_seconds: duration,
        duration_formatted: duration.map(stats::format_duration),
        distance_meters: distance,
        distance_km: distance.map(|d| stats::round_to(d / 1000.0, 2)),
        distance_miles: distance.map(|d| stats::round_to(d / METERS_PER_MILE, 2)),
        total_calories: session.numeric("total_calories")?,
        avg_heart_rate: session.numeric("avg_heart_rate")?,
        max_heart_rate: session.numeric("max_heart_rate")?,
        total_ascent: session.numeric("total_ascent")?,
        total_descent: session.numeric("total_descent")?,
    }))
}
