//! Cadence analysis.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{numeric_series, FieldMapExt, FieldTypeError};

#[derive(Debug, Clone, Serialize)]
pub struct CadenceAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence_std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence_consistency: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<CadenceAnalysis>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let cadences = numeric_series(&activity.records, "cadence")?;
    let (std_dev, consistency) = if cadences.is_empty() {
        (None, None)
    } else {
        (
            Some(stats::round_to(stats::std_dev(&cadences), 2)),
            Some(stats::consistency_score(&cadences)),
        )
    };

    let analysis = CadenceAnalysis {
        // Running watches report cadence under the running-specific names.
        avg_cadence: session.first_numeric(&["avg_cadence", "avg_running_cadence"])?,
        max_cadence: session.first_numeric(&["max_cadence", "max_running_cadence"])?,
        cadence_std_dev: std_dev,
        cadence_consistency: consistency,
    };

    if analysis.avg_cadence.is_none()
        && analysis.max_cadence.is_none()
        && analysis.cadence_std_dev.is_none()
    {
        return Ok(None);
    }
    Ok(Some(analysis))
}
