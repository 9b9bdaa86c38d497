//! Power analysis (cycling and running power).

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{numeric_series, FieldMapExt, FieldTypeError};

#[derive(Debug, Clone, Serialize)]
pub struct PowerAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_power: Option<f64>,
    /// Vendor-computed TSS, passed through rather than recomputed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_stress_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_work: Option<f64>,
    /// Standard deviation of the per-record power series, watts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_variability: Option<f64>,
}

pub(crate) fn compute(activity: &ParsedActivity) -> Result<Option<PowerAnalysis>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let powers = numeric_series(&activity.records, "power")?;

    let analysis = PowerAnalysis {
        avg_power: session.numeric("avg_power")?,
        max_power: session.numeric("max_power")?,
        normalized_power: session.numeric("normalized_power")?,
        training_stress_score: session.numeric("training_stress_score")?,
        intensity_factor: session.numeric("intensity_factor")?,
        total_work: session.numeric("total_work")?,
        power_variability: if powers.is_empty() {
            None
        } else {
            Some(stats::round_to(stats::std_dev(&powers), 2))
        },
    };

    let empty = analysis.avg_power.is_none()
        && analysis.max_power.is_none()
        && analysis.normalized_power.is_none()
        && analysis.training_stress_score.is_none()
        && analysis.intensity_factor.is_none()
        && analysis.total_work.is_none()
        && analysis.power_variability.is_none();
    if empty {
        return Ok(None);
    }
    Ok(Some(analysis))
}
