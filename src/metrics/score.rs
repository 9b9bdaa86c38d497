//! Composite performance score.
//!
//! Training Effect and Training Stress Score are vendor-computed summaries;
//! they are passed through and folded into a 0-100 composite.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{FieldMapExt, FieldTypeError};

/// Training Effect tops out around 5.0 on Garmin's scale.
const MAX_TRAINING_EFFECT: f64 = 5.0;
/// A TSS of 200 is an extremely hard session.
const MAX_TRAINING_STRESS: f64 = 200.0;

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anaerobic_training_effect: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_stress_score: Option<f64>,
    /// Mean of the available scaled factors; absent when neither Training
    /// Effect nor TSS was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<PerformanceScore>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let training_effect = session.numeric("total_training_effect")?;
    let anaerobic_training_effect = session.numeric("total_anaerobic_training_effect")?;
    let training_stress_score = session.numeric("training_stress_score")?;

    let mut factors = Vec::new();
    if let Some(te) = training_effect.filter(|v| *v > 0.0) {
        factors.push((te / MAX_TRAINING_EFFECT * 100.0).clamp(0.0, 100.0));
    }
    if let Some(tss) = training_stress_score.filter(|v| *v > 0.0) {
        factors.push((tss / MAX_TRAINING_STRESS * 100.0).clamp(0.0, 100.0));
    }
    let overall_score = stats::mean(&factors).map(|m| stats::round_to(m, 1));

    if training_effect.is_none()
        && anaerobic_training_effect.is_none()
        && training_stress_score.is_none()
    {
        return Ok(None);
    }
    Ok(Some(PerformanceScore {
        training_effect,
        anaerobic_training_effect,
        training_stress_score,
        overall_score,
    }))
}
