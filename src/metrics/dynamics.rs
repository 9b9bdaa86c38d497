//! Running dynamics passthrough.
//!
//! These values come only from devices that record them (HRM-Pro straps,
//! newer watches); nothing is derived here.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::value::{FieldMapExt, FieldTypeError};

#[derive(Debug, Clone, Serialize)]
pub struct RunningDynamics {
    /// Vertical oscillation, millimeters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_oscillation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_ratio: Option<f64>,
    /// Ground contact time, milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance_time_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance_time_balance: Option<f64>,
    /// Step length, millimeters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<RunningDynamics>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let dynamics = RunningDynamics {
        vertical_oscillation: session.numeric("avg_vertical_oscillation")?,
        vertical_ratio: session.numeric("avg_vertical_ratio")?,
        stance_time: session.numeric("avg_stance_time")?,
        stance_time_percent: session.numeric("avg_stance_time_percent")?,
        stance_time_balance: session.numeric("avg_stance_time_balance")?,
        step_length: session.numeric("avg_step_length")?,
        total_steps: session.numeric("total_steps")?,
    };

    let empty = dynamics.vertical_oscillation.is_none()
        && dynamics.vertical_ratio.is_none()
        && dynamics.stance_time.is_none()
        && dynamics.stance_time_percent.is_none()
        && dynamics.stance_time_balance.is_none()
        && dynamics.step_length.is_none()
        && dynamics.total_steps.is_none();
    if empty {
        return Ok(None);
    }
    Ok(Some(dynamics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testutil::{activity, field_map};
    use crate::value::FieldValue;

    #[test]
    fn test_passthrough() {
        let session = field_map(&[
            ("avg_vertical_oscillation", FieldValue::Float(8.4)),
            ("avg_stance_time", FieldValue::Float(248.0)),
            ("total_steps", FieldValue::UInteger(8642)),
        ]);
        let dynamics = compute(&activity(vec![session], vec![], vec![]))
            .unwrap()
            .unwrap();
        assert_eq!(dynamics.vertical_oscillation, Some(8.4));
        assert_eq!(dynamics.stance_time, Some(248.0));
        assert_eq!(dynamics.total_steps, Some(8642.0));
        assert_eq!(dynamics.step_length, None);
    }

    #[test]
    fn test_absent_without_dynamics_fields() {
        assert!(compute(&activity(vec![field_map(&[])], vec![], vec![]))
            .unwrap()
            .is_none());
    }
}
