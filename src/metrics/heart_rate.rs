//! Heart-rate analysis: series statistics, five-zone distribution,
//! cardiac drift, and time in zones.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::metrics::zones::{zone_distribution, ZoneBucket};
use crate::value::{numeric_series, FieldMapExt, FieldTypeError};

const HR_ZONE_NAMES: [&str; 5] = ["Recovery", "Endurance", "Tempo", "Threshold", "VO2 Max"];

/// Samples required before the first-half/second-half drift comparison
/// carries any signal.
const DRIFT_MIN_SAMPLES: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct HeartRateAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<ZoneBucket>,
    /// First-half vs second-half mean drift, percent. 0.0 when the series is
    /// too short to say anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_drift_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_zones: Option<TimeInZones>,
}

/// Seconds per zone, assuming the usual one record per second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeInZones {
    pub zone1_seconds: u32,
    pub zone2_seconds: u32,
    pub zone3_seconds: u32,
    pub zone4_seconds: u32,
    pub zone5_seconds: u32,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<HeartRateAnalysis>, FieldTypeError> {
    let Some(session) = activity.session() else {
        return Ok(None);
    };
    if activity.records.is_empty() {
        return Ok(None);
    }

    let hr = numeric_series(&activity.records, "heart_rate")?;
    if hr.is_empty() {
        // No per-record signal: fall back to the session scalars.
        let avg = session.numeric("avg_heart_rate")?;
        let max = session.numeric("max_heart_rate")?;
        let min = session.numeric("min_heart_rate")?;
        if avg.is_none() && max.is_none() && min.is_none() {
            return Ok(None);
        }
        return Ok(Some(HeartRateAnalysis {
            avg,
            max,
            min,
            median: None,
            std_dev: None,
            zones: Vec::new(),
            hr_drift_percent: None,
            time_in_zones: None,
        }));
    }

    let series_max = hr.iter().cloned().fold(f64::MIN, f64::max);
    let series_min = hr.iter().cloned().fold(f64::MAX, f64::min);
    // The session's recorded max is authoritative when present; otherwise
    // anchor the zones on the hardest observed sample.
    let max_hr = session.numeric("max_heart_rate")?.unwrap_or(series_max);

    let zones = if max_hr > 0.0 {
        let thresholds = [0.6, 0.7, 0.8, 0.9].map(|fraction| fraction * max_hr);
        zone_distribution(&hr, HR_ZONE_NAMES, thresholds, Some(max_hr))
    } else {
        Vec::new()
    };
    let time_in_zones = time_in_zones(&zones);

    Ok(Some(HeartRateAnalysis {
        avg: stats::mean(&hr).map(|m| stats::round_to(m, 1)),
        max: Some(series_max),
        min: Some(series_min),
        median: stats::median(&hr),
        std_dev: Some(stats::round_to(stats::std_dev(&hr), 2)),
        zones,
        hr_drift_percent: Some(hr_drift(&hr)),
        time_in_zones,
    }))
}

/// Cardiac drift: how much the second-half mean rose over the first-half
/// mean, in percent. Positive drift at steady pace indicates accumulating
/// cardiovascular strain.
fn hr_drift(hr: &[f64]) -> f64 {
    if hr.len() < DRIFT_MIN_SAMPLES {
        return 0.0;
    }
    let mid = hr.len() / 2;
    let (Some(first), Some(second)) = (stats::mean(&hr[..mid]), stats::mean(&hr[mid..])) else {
        return 0.0;
    };
    stats::round_to((second - first) / first * 100.0, 2)
}

fn time_in_zones(zones: &[ZoneBucket]) -> Option<TimeInZones> {
    match zones {
        [z1, z2, z3, z4, z5] => Some(TimeInZones {
            zone1_seconds: z1.count,
            zone2_seconds: z2.count,
            zone3_seconds: z3.count,
            zone4_seconds: z4.count,
            zone5_seconds: z5.count,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testutil::{activity, field_map, hr_record};
    use crate::value::FieldValue;

    #[test]
    fn test_zone_partition_sums_to_sample_count() {
        let records: Vec<_> = (0..120).map(|i| hr_record(95 + i % 90)).collect();
        let session = field_map(&[("max_heart_rate", FieldValue::UInteger(190))]);
        let analysis = compute(&activity(vec![session], vec![], records))
            .unwrap()
            .unwrap();
        let total: u32 = analysis.zones.iter().map(|z| z.count).sum();
        assert_eq!(total, 120);
    }

    #[test]
    fn test_drift_scenario() {
        // 20 samples at 140 then 20 at 154: drift is exactly 10%.
        let records: Vec<_> = std::iter::repeat(140)
            .take(20)
            .chain(std::iter::repeat(154).take(20))
            .map(hr_record)
            .collect();
        let analysis = compute(&activity(vec![field_map(&[])], vec![], records))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.hr_drift_percent, Some(10.0));
    }

    #[test]
    fn test_drift_needs_twenty_samples() {
        let records: Vec<_> = (0..19).map(|i| hr_record(130 + i)).collect();
        let analysis = compute(&activity(vec![field_map(&[])], vec![], records))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.hr_drift_percent, Some(0.0));
    }

    #[test]
    fn test_session_fallback_when_records_lack_hr() {
        let session = field_map(&[
            ("avg_heart_rate", FieldValue::UInteger(147)),
            ("max_heart_rate", FieldValue::UInteger(171)),
        ]);
        let records = vec![field_map(&[("speed", FieldValue::Float(3.1))])];
        let analysis = compute(&activity(vec![session], vec![], records))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.avg, Some(147.0));
        assert_eq!(analysis.max, Some(171.0));
        assert!(analysis.zones.is_empty());
        assert_eq!(analysis.median, None);
    }

    #[test]
    fn test_series_statistics() {
        let records: Vec<_> = [140, 150, 160, 150].iter().map(|&h| hr_record(h)).collect();
        let analysis = compute(&activity(vec![field_map(&[])], vec![], records))
            .unwrap()
            .unwrap();
        assert_eq!(analysis.avg, Some(150.0));
        assert_eq!(analysis.max, Some(160.0));
        assert_eq!(analysis.min, Some(140.0));
        assert_eq!(analysis.median, Some(150.0));
    }

    #[test]
    fn test_time_in_zones_mirrors_zone_counts() {
        let records: Vec<_> = (0..60).map(|i| hr_record(100 + i)).collect();
        let session = field_map(&[("max_heart_rate", FieldValue::UInteger(180))]);
        let analysis = compute(&activity(vec![session], vec![], records))
            .unwrap()
            .unwrap();
        let tiz = analysis.time_in_zones.unwrap();
        let total =
            tiz.zone1_seconds + tiz.zone2_seconds + tiz.zone3_seconds + tiz.zone4_seconds
                + tiz.zone5_seconds;
        assert_eq!(total, 60);
    }

    #[test]
    fn test_malformed_heart_rate_is_error() {
        let records = vec![field_map(&[(
            "heart_rate",
            FieldValue::Text("not a number".to_string()),
        )])];
        assert!(compute(&activity(vec![field_map(&[])], vec![], records)).is_err());
    }
}
