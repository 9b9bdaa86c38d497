//! Metrics Engine.
//!
//! Consumes one [`ParsedActivity`] and computes every derived analytics
//! section. Sections are independent: missing source signals make a section
//! absent, and a computation failure (malformed numeric data) is scoped to
//! that single section so the rest of the result still completes.

mod basic;
mod cadence;
mod dynamics;
mod efficiency;
mod elevation;
mod fatigue;
mod heart_rate;
mod pace_speed;
mod power;
mod score;
mod splits;
mod stats;
mod zones;

pub use basic::BasicStats;
pub use cadence::CadenceAnalysis;
pub use dynamics::RunningDynamics;
pub use efficiency::EfficiencyMetrics;
pub use elevation::ElevationAnalysis;
pub use fatigue::{FatigueAnalysis, QuartileHeartRate, QuartileSpeed};
pub use heart_rate::{HeartRateAnalysis, TimeInZones};
pub use pace_speed::PaceSpeedAnalysis;
pub use power::PowerAnalysis;
pub use score::PerformanceScore;
pub use splits::LapSplit;
pub use zones::{TrainingZones, ZoneBucket};

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;

use crate::error::FitAnalyticsError;
use crate::extractor::ParsedActivity;
use crate::value::FieldTypeError;

/// All derived analytics for one activity, immutable after construction.
///
/// Every section is independently absent when its source signals are; serde
/// skips absent sections so consumers can read whatever is present by key.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_stats: Option<BasicStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_analysis: Option<HeartRateAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_speed_analysis: Option<PaceSpeedAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_analysis: Option<ElevationAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence_analysis: Option<CadenceAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_analysis: Option<PowerAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_dynamics: Option<RunningDynamics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<LapSplit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<TrainingZones>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_metrics: Option<EfficiencyMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_analysis: Option<FatigueAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<PerformanceScore>,
    /// Per-section computation failures (malformed numeric data). A failed
    /// section is absent above; everything else still completed.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub section_errors: BTreeMap<String, String>,
}

/// Compute every metrics section for one activity.
pub fn analyze(activity: &ParsedActivity) -> MetricsResult {
    let mut errors = BTreeMap::new();

    let result = MetricsResult {
        basic_stats: section("basic_stats", &mut errors, || basic::compute(activity)),
        heart_rate_analysis: section("heart_rate_analysis", &mut errors, || {
            heart_rate::compute(activity)
        }),
        pace_speed_analysis: section("pace_speed_analysis", &mut errors, || {
            pace_speed::compute(activity)
        }),
        elevation_analysis: section("elevation_analysis", &mut errors, || {
            elevation::compute(activity)
        }),
        cadence_analysis: section("cadence_analysis", &mut errors, || cadence::compute(activity)),
        power_analysis: section("power_analysis", &mut errors, || power::compute(activity)),
        running_dynamics: section("running_dynamics", &mut errors, || dynamics::compute(activity)),
        splits: section("splits", &mut errors, || splits::compute(activity).map(Some))
            .unwrap_or_default(),
        zones: section("zones", &mut errors, || zones::compute(activity)),
        efficiency_metrics: section("efficiency_metrics", &mut errors, || {
            efficiency::compute(activity)
        }),
        fatigue_analysis: section("fatigue_analysis", &mut errors, || fatigue::compute(activity)),
        performance_score: section("performance_score", &mut errors, || score::compute(activity)),
        section_errors: errors,
    };

    debug!(
        "[Metrics] analyzed {} records, {} laps ({} section errors)",
        activity.records.len(),
        activity.laps.len(),
        result.section_errors.len()
    );
    result
}

/// Run one section, converting a malformed-data failure into a recorded
/// per-section error instead of aborting the whole analysis.
fn section<T>(
    name: &str,
    errors: &mut BTreeMap<String, String>,
    compute: impl FnOnce() -> Result<Option<T>, FieldTypeError>,
) -> Option<T> {
    match compute() {
        Ok(section) => section,
        Err(source) => {
            let error = FitAnalyticsError::Computation {
                section: name.to_string(),
                message: source.to_string(),
            };
            warn!("[Metrics] {}", error);
            errors.insert(name.to_string(), source.to_string());
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::{activity, field_map, hr_record};
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn test_empty_activity_yields_empty_result() {
        let result = analyze(&activity(vec![], vec![], vec![]));
        assert!(result.basic_stats.is_none());
        assert!(result.heart_rate_analysis.is_none());
        assert!(result.power_analysis.is_none());
        assert!(result.splits.is_empty());
        assert!(result.section_errors.is_empty());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_damaged_section_does_not_abort_the_rest() {
        let session = field_map(&[
            ("total_distance", FieldValue::Float(5000.0)),
            ("total_timer_time", FieldValue::Float(1800.0)),
            // Malformed: a numeric field holding text.
            ("total_ascent", FieldValue::Text("uphill".to_string())),
        ]);
        let result = analyze(&activity(vec![session], vec![], vec![]));

        // basic_stats and elevation_analysis both read total_ascent and fail...
        assert!(result.section_errors.contains_key("basic_stats"));
        assert!(result.section_errors.contains_key("elevation_analysis"));
        assert!(result.basic_stats.is_none());
        // ...while untouched sections still complete.
        assert!(result.pace_speed_analysis.is_none());
        assert_eq!(result.section_errors.len(), 2);
    }

    #[test]
    fn test_full_result_serializes_by_section_key() {
        let session = field_map(&[
            ("total_distance", FieldValue::Float(5000.0)),
            ("total_timer_time", FieldValue::Float(1800.0)),
            ("avg_speed", FieldValue::Float(2.7778)),
            ("avg_heart_rate", FieldValue::UInteger(150)),
            ("max_heart_rate", FieldValue::UInteger(180)),
            ("total_calories", FieldValue::UInteger(340)),
        ]);
        let records: Vec<_> = (0..40).map(|i| hr_record(130 + i % 30)).collect();
        let result = analyze(&activity(vec![session], vec![], records));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["basic_stats"]["distance_km"], 5.0);
        assert_eq!(json["basic_stats"]["duration_formatted"], "00:30:00");
        assert_eq!(json["pace_speed_analysis"]["avg_pace_min_per_km"], "06:00");
        assert_eq!(json["efficiency_metrics"]["calories_per_km"], 68.0);
        assert!(json["heart_rate_analysis"]["zones"].is_array());
        // No power sensor: the section key is absent entirely.
        assert!(json.get("power_analysis").is_none());
        assert!(json.get("zones").is_none());
    }
}
