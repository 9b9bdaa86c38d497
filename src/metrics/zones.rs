//! Zone partition primitives and the power-zone section.
//!
//! Both heart-rate and power zones use the same five-band linear scan: a
//! sample lands in the first zone whose upper threshold it is below, and the
//! last zone catches everything else, so the five counts always sum to the
//! sample count.

use serde::Serialize;

use crate::extractor::ParsedActivity;
use crate::metrics::stats;
use crate::value::{numeric_series, FieldTypeError};

/// One band of a five-zone distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneBucket {
    /// Zone number, 1-5.
    pub zone: u8,
    pub name: String,
    /// Inclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound; `None` for an unbounded top zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    pub count: u32,
    /// Share of samples in this zone, percent, 1 decimal.
    pub percentage: f64,
}

/// Partition `samples` across five zones delimited by four ascending upper
/// thresholds. `top` is the reported (not enforced) upper bound of zone 5.
pub(crate) fn zone_distribution(
    samples: &[f64],
    names: [&str; 5],
    thresholds: [f64; 4],
    top: Option<f64>,
) -> Vec<ZoneBucket> {
    let mut counts = [0u32; 5];
    for &sample in samples {
        let mut zone = 4;
        for (i, &threshold) in thresholds.iter().enumerate() {
            if sample < threshold {
                zone = i;
                break;
            }
        }
        counts[zone] += 1;
    }

    let total = samples.len() as f64;
    (0..5)
        .map(|i| ZoneBucket {
            zone: (i + 1) as u8,
            name: names[i].to_string(),
            lower: if i == 0 { 0.0 } else { thresholds[i - 1] },
            upper: if i < 4 { Some(thresholds[i]) } else { top },
            count: counts[i],
            percentage: if total > 0.0 {
                stats::round_to(counts[i] as f64 / total * 100.0, 1)
            } else {
                0.0
            },
        })
        .collect()
}

/// The `zones` section of a metrics result. Power-only for now: heart-rate
/// zones live inside the heart-rate section.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingZones {
    pub power_zones: Vec<ZoneBucket>,
}

const POWER_ZONE_NAMES: [&str; 5] = [
    "Active Recovery",
    "Endurance",
    "Tempo",
    "Threshold",
    "VO2 Max",
];

/// Power zones banded around the activity's own average power.
///
/// Anchoring on the activity average (rather than a configured FTP) makes
/// the banding self-referential across activities; that is observed,
/// intentional behavior.
pub(crate) fn compute(activity: &ParsedActivity) -> Result<Option<TrainingZones>, FieldTypeError> {
    if activity.records.is_empty() {
        return Ok(None);
    }
    let powers = numeric_series(&activity.records, "power")?;
    let avg_power = match stats::mean(&powers) {
        Some(avg) if avg > 0.0 => avg,
        _ => return Ok(None),
    };

    let thresholds = [0.55, 0.75, 0.90, 1.05].map(|fraction| fraction * avg_power);
    Ok(Some(TrainingZones {
        power_zones: zone_distribution(&powers, POWER_ZONE_NAMES, thresholds, None),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testutil::{activity, field_map};
    use crate::value::FieldValue;

    #[test]
    fn test_zone_counts_sum_to_sample_count() {
        let samples: Vec<f64> = (0..157).map(|i| 60.0 + (i % 130) as f64).collect();
        let zones = zone_distribution(
            &samples,
            ["Z1", "Z2", "Z3", "Z4", "Z5"],
            [114.0, 133.0, 152.0, 171.0],
            Some(190.0),
        );
        let total: u32 = zones.iter().map(|z| z.count).sum();
        assert_eq!(total as usize, samples.len());
    }

    #[test]
    fn test_boundary_sample_goes_to_upper_zone() {
        // An exclusive upper bound sends a boundary sample up a zone.
        let zones = zone_distribution(
            &[114.0],
            ["Z1", "Z2", "Z3", "Z4", "Z5"],
            [114.0, 133.0, 152.0, 171.0],
            Some(190.0),
        );
        assert_eq!(zones[0].count, 0);
        assert_eq!(zones[1].count, 1);
    }

    #[test]
    fn test_power_zones_band_around_average() {
        let records: Vec<_> = [180.0, 200.0, 220.0]
            .iter()
            .map(|p| field_map(&[("power", FieldValue::Float(*p))]))
            .collect();
        let section = compute(&activity(vec![], vec![], records)).unwrap().unwrap();

        // Average is 200W, so the Threshold band spans 180-210W.
        let threshold = &section.power_zones[3];
        assert_eq!(threshold.name, "Threshold");
        assert!((threshold.lower - 180.0).abs() < 1e-9);
        assert_eq!(threshold.upper, Some(210.0));
        assert_eq!(threshold.count, 2);
        // Top band is unbounded and holds the 220W sample.
        assert_eq!(section.power_zones[4].upper, None);
        assert_eq!(section.power_zones[4].count, 1);
    }

    #[test]
    fn test_no_power_records_is_absent() {
        let records = vec![field_map(&[("heart_rate", FieldValue::UInteger(140))])];
        assert!(compute(&activity(vec![], vec![], records)).unwrap().is_none());
    }
}
