//! Efficiency ratios.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{FieldMapExt, FieldTypeError};

#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyMetrics {
    /// Speed in km/h per heartbeat-per-minute: faster at lower heart rate is
    /// better aerobic fitness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aerobic_efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_per_km: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<EfficiencyMetrics>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    // Ratios require both operands actually recorded and positive; a
    // substituted zero would manufacture a false signal.
    let avg_speed = session.prefer_enhanced("avg_speed")?.filter(|v| *v > 0.0);
    let avg_hr = session.numeric("avg_heart_rate")?.filter(|v| *v > 0.0);
    let aerobic_efficiency = match (avg_speed, avg_hr) {
        (Some(speed), Some(hr)) => Some(stats::round_to(speed * 3.6 / hr, 4)),
        _ => None,
    };

    let distance = session.numeric("total_distance")?.filter(|v| *v > 0.0);
    let calories = session.numeric("total_calories")?.filter(|v| *v > 0.0);
    let calories_per_km = match (distance, calories) {
        (Some(distance), Some(calories)) => {
            Some(stats::round_to(calories / (distance / 1000.0), 2))
        }
        _ => None,
    };

    if aerobic_efficiency.is_none() && calories_per_km.is_none() {
        return Ok(None);
    }
    Ok(Some(EfficiencyMetrics {
        aerobic_efficiency,
        calories_per_km,
    }))
}
