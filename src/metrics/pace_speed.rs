//! Pace and speed analysis.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{enhanced_series, FieldMapExt, FieldTypeError};

const KMH_PER_MS: f64 = 3.6;
const MPH_PER_MS: f64 = 2.237;
const METERS_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Serialize)]
pub struct PaceSpeedAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed_mph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_mph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace_min_per_km: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace_min_per_mile: Option<String>,
    /// Standard deviation of the per-record speed series, m/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_variability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency_score: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<PaceSpeedAnalysis>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };

    let avg_speed = session.prefer_enhanced("avg_speed")?;
    let max_speed = session.prefer_enhanced("max_speed")?;

    // Pace only makes sense for forward motion.
    let moving = avg_speed.filter(|v| *v > 0.0);
    let pace_km = moving.map(|v| stats::format_pace(1000.0 / (v * 60.0)));
    let pace_mile = moving.map(|v| stats::format_pace(METERS_PER_MILE / (v * 60.0)));

    let speeds = enhanced_series(&activity.records, "speed")?;
    let (variability, consistency) = if speeds.is_empty() {
        (None, None)
    } else {
        (
            Some(stats::round_to(stats::std_dev(&speeds), 3)),
            Some(stats::consistency_score(&speeds)),
        )
    };

    let analysis = PaceSpeedAnalysis {
        avg_speed_ms: avg_speed,
        avg_speed_kmh: avg_speed.map(|v| stats::round_to(v * KMH_PER_MS, 2)),
        avg_speed_mph: avg_speed.map(|v| stats::round_to(v * MPH_PER_MS, 2)),
        max_speed_ms: max_speed,
        max_speed_kmh: max_speed.map(|v| stats::round_to(v * KMH_PER_MS, 2)),
        max_speed_mph: max_speed.map(|v| stats::round_to(v * MPH_PER_MS, 2)),
        avg_pace_min_per_km: pace_km,
        avg_pace_min_per_mile: pace_mile,
        speed_variability: variability,
        consistency_score: consistency,
    };

    if analysis.avg_speed_ms.is_none()
        && analysis.max_speed_ms.is_none()
        && analysis.speed_variability.is_none()
    {
        return Ok(None);
    }
    Ok(Some(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testutil::{activity, field_map, speed_record};
    use crate::value::FieldValue;

    #[test]
    fn test_pace_scenario_ten_kmh() {
        // 2.7778 m/s is 10 km/h, a 6:00 min/km pace.
        let session = field_map(&[("avg_speed", FieldValue::Float(2.7778))]);
        let analysis = compute(&activity(vec![session], vec![], vec![]))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.avg_pace_min_per_km.as_deref(), Some("06:00"));
        assert_eq!(analysis.avg_speed_kmh, Some(10.0));
    }

    #[test]
    fn test_enhanced_speed_preferred() {
        let session = field_map(&[
            ("avg_speed", FieldValue::Float(2.0)),
            ("enhanced_avg_speed", FieldValue::Float(3.0)),
        ]);
        let analysis = compute(&activity(vec![session], vec![], vec![]))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.avg_speed_ms, Some(3.0));
        assert_eq!(analysis.avg_speed_kmh, Some(10.8));
    }

    #[test]
    fn test_no_pace_for_zero_speed() {
        let session = field_map(&[("avg_speed", FieldValue::Float(0.0))]);
        let analysis = compute(&activity(vec![session], vec![], vec![]))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.avg_pace_min_per_km, None);
        assert_eq!(analysis.avg_speed_ms, Some(0.0));
    }

    #[test]
    fn test_consistency_from_record_series() {
        let records: Vec<_> = [3.0, 3.0, 3.0, 3.0].iter().map(|&v| speed_record(v)).collect();
        let analysis = compute(&activity(vec![field_map(&[])], vec![], records))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.consistency_score, Some(100.0));
        assert_eq!(analysis.speed_variability, Some(0.0));
    }

    #[test]
    fn test_absent_without_any_speed_signal() {
        let analysis = compute(&activity(vec![field_map(&[])], vec![], vec![])).unwrap();
        assert!(analysis.is_none());
    }
}
