//! Fatigue analysis over contiguous record quartiles.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{enhanced_series, numeric_series, FieldMap, FieldTypeError};

/// Records required before quartile comparisons mean anything.
const MIN_RECORDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileHeartRate {
    /// Quartile number, 1-4.
    pub quartile: u8,
    pub avg_hr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileSpeed {
    /// Quartile number, 1-4.
    pub quartile: u8,
    pub avg_speed_kmh: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FatigueAnalysis {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hr_progression: Vec<QuartileHeartRate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speed_progression: Vec<QuartileSpeed>,
    /// First-quartile vs last-quartile speed decay, percent. Positive means
    /// slowdown (fatigue), negative means a strong finish; downstream
    /// insight generation depends on the sign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_index_percent: Option<f64>,
}

pub(crate) fn compute(
    activity: &ParsedActivity,
) -> Result<Option<FatigueAnalysis>, FieldTypeError> {
    let records = &activity.records;
    if records.len() < MIN_RECORDS {
        return Ok(None);
    }

    // Contiguous index quartiles; integer division leaves the remainder
    // records in the last quartile.
    let quartile_size = records.len() / 4;
    let quartiles: [&[FieldMap]; 4] = [
        &records[..quartile_size],
        &records[quartile_size..2 * quartile_size],
        &records[2 * quartile_size..3 * quartile_size],
        &records[3 * quartile_size..],
    ];

    let mut hr_progression = Vec::new();
    let mut speed_progression = Vec::new();
    for (index, quartile) in quartiles.iter().enumerate() {
        let number = (index + 1) as u8;
        if let Some(avg) = stats::mean(&numeric_series(quartile, "heart_rate")?) {
            hr_progression.push(QuartileHeartRate {
                quartile: number,
                avg_hr: stats::round_to(avg, 1),
            });
        }
        if let Some(avg) = stats::mean(&enhanced_series(quartile, "speed")?) {
            speed_progression.push(QuartileSpeed {
                quartile: number,
                avg_speed_kmh: stats::round_to(avg * 3.6, 2),
            });
        }
    }

    let fatigue_index_percent = match (speed_progression.first(), speed_progression.last()) {
        (Some(first), Some(last)) if speed_progression.len() >= 2 && first.avg_speed_kmh > 0.0 => {
            Some(stats::round_to(
                (first.avg_speed_kmh - last.avg_speed_kmh) / first.avg_speed_kmh * 100.0,
                2,
            ))
        }
        _ => None,
    };

    if hr_progression.is_empty() && speed_progression.is_empty() {
        return Ok(None);
    }
    Ok(Some(FatigueAnalysis {
        hr_progression,
        speed_progression,
        fatigue_index_percent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testutil::{activity, speed_record};

    fn speed_records(speeds: &[f64]) -> Vec<FieldMap> {
        speeds.iter().map(|&v| speed_record(v)).collect()
    }

    #[test]
    fn test_slowing_down_is_positive_fatigue() {
        // Speed decays monotonically across quartiles: index must be > 0.
        let speeds: Vec<f64> = (0..40).map(|i| 4.0 - (i as f64) * 0.05).collect();
        let fatigue = compute(&activity(vec![], vec![], speed_records(&speeds)))
            .unwrap()
            .unwrap();
        assert!(fatigue.fatigue_index_percent.unwrap() > 0.0);
    }

    #[test]
    fn test_negative_split_is_negative_fatigue() {
        let speeds: Vec<f64> = (0..40).map(|i| 2.0 + (i as f64) * 0.05).collect();
        let fatigue = compute(&activity(vec![], vec![], speed_records(&speeds)))
            .unwrap()
            .unwrap();
        assert!(fatigue.fatigue_index_percent.unwrap() < 0.0);
    }

    #[test]
    fn test_quartile_split_appends_remainder_to_last() {
        // 43 records: quartiles of 10/10/10/13.
        let speeds: Vec<f64> = (0..43).map(|_| 3.0).collect();
        let fatigue = compute(&activity(vec![], vec![], speed_records(&speeds)))
            .unwrap()
            .unwrap();
        assert_eq!(fatigue.speed_progression.len(), 4);
        assert_eq!(fatigue.fatigue_index_percent, Some(0.0));
    }

    #[test]
    fn test_too_few_records_is_absent() {
        let speeds: Vec<f64> = (0..9).map(|_| 3.0).collect();
        assert!(compute(&activity(vec![], vec![], speed_records(&speeds)))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_no_index_without_speed_signal() {
        let records: Vec<FieldMap> = (0..40)
            .map(|_| crate::metrics::testutil::hr_record(150))
            .collect();
        let fatigue = compute(&activity(vec![], vec![], records)).unwrap().unwrap();
        assert!(fatigue.speed_progression.is_empty());
        assert_eq!(fatigue.fatigue_index_percent, None);
        assert_eq!(fatigue.hr_progression.len(), 4);
    }
}
