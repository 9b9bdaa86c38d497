//! Elevation analysis.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{enhanced_series, FieldMapExt, FieldTypeError};

#[derive(Debug, Clone, Serialize)]
pub struct ElevationAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_descent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pos_grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_neg_grade: Option<f64>,
    /// Standard deviation of the per-record altitude series, meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_variability: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<ElevationAnalysis>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let altitudes = enhanced_series(&activity.records, "altitude")?;

    let analysis = ElevationAnalysis {
        total_ascent: session.numeric("total_ascent")?,
        total_descent: session.numeric("total_descent")?,
        avg_altitude: session.prefer_enhanced("avg_altitude")?,
        max_altitude: session.prefer_enhanced("max_altitude")?,
        min_altitude: session.prefer_enhanced("min_altitude")?,
        avg_grade: session.numeric("avg_grade")?,
        max_pos_grade: session.numeric("max_pos_grade")?,
        max_neg_grade: session.numeric("max_neg_grade")?,
        altitude_variability: if altitudes.is_empty() {
            None
        } else {
            Some(stats::round_to(stats::std_dev(&altitudes), 2))
        },
    };

    let empty = analysis.total_ascent.is_none()
        && analysis.total_descent.is_none()
        && analysis.avg_altitude.is_none()
        && analysis.max_altitude.is_none()
        && analysis.min_altitude.is_none()
        && analysis.avg_grade.is_none()
        && analysis.altitude_variability.is_none();
    if empty {
        return Ok(None);
    }
    Ok(Some(analysis))
}
