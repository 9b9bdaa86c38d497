//! Structured Extractor.
//!
//! Normalizes the decoder's grouped raw messages into named collections
//! without dropping a single field: different manufacturers populate
//! different field subsets, and analytics consumers must see everything the
//! device recorded. Also answers two read-only diagnostic queries over the
//! decoded message map (available-fields report, capability summary).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::decoder::DecodedFit;
use crate::value::{FieldMap, FieldMapExt};

pub(crate) const KIND_FILE_ID: &str = "file_id";
pub(crate) const KIND_DEVICE_INFO: &str = "device_info";
pub(crate) const KIND_ACTIVITY: &str = "activity";
pub(crate) const KIND_SESSION: &str = "session";
pub(crate) const KIND_LAP: &str = "lap";
pub(crate) const KIND_RECORD: &str = "record";
pub(crate) const KIND_EVENT: &str = "event";
pub(crate) const KIND_HRV: &str = "hrv";
pub(crate) const KIND_DEVELOPER_DATA_ID: &str = "developer_data_id";
pub(crate) const KIND_FIELD_DESCRIPTION: &str = "field_description";

// ============================================================================
// Types
// ============================================================================

/// One fully-extracted activity file, immutable after construction.
///
/// Collection order is file order, which for sessions/laps/records is also
/// ascending-timestamp order — split and quartile analyses rely on it.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedActivity {
    /// The `file_id` message (manufacturer, product, serial, created time).
    pub file_info: FieldMap,
    /// The `activity` wrap-up message (session count, local timestamp).
    pub activity_summary: FieldMap,
    /// Every connected device/sensor the watch reported.
    pub device_info: Vec<FieldMap>,
    /// Activity summaries; index 0 is authoritative for activity-level stats.
    pub sessions: Vec<FieldMap>,
    /// Lap summaries in file order.
    pub laps: Vec<FieldMap>,
    /// Point samples (typically one per second) in file order.
    pub records: Vec<FieldMap>,
    /// Timer/workout events.
    pub events: Vec<FieldMap>,
    /// Beat-to-beat interval samples.
    pub hrv: Vec<FieldMap>,
    /// ConnectIQ and other developer-defined field descriptions.
    pub developer_fields: DeveloperFields,
    pub metadata: ActivityMetadata,
}

impl ParsedActivity {
    /// The authoritative session, when the file has one.
    pub fn session(&self) -> Option<&FieldMap> {
        self.sessions.first()
    }
}

/// Developer-defined field registrations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeveloperFields {
    pub data_ids: Vec<FieldMap>,
    pub field_descriptions: Vec<FieldMap>,
}

/// Decode provenance carried alongside the extracted collections.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityMetadata {
    /// When this extraction ran.
    pub parsed_at: DateTime<Utc>,
    /// Source path, when decoded from a file.
    pub source: Option<String>,
    pub file_size_bytes: u64,
    /// Decoder warnings (CRC mismatches, truncation).
    pub warnings: Vec<String>,
    /// Message count per decoded kind, including kinds not extracted above.
    pub message_counts: BTreeMap<String, usize>,
}

/// Which signals the file actually carries, for quick capability gating.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapabilitySummary {
    pub has_gps: bool,
    pub has_heart_rate: bool,
    pub has_power: bool,
    pub has_cadence: bool,
    pub has_temperature: bool,
    pub has_running_dynamics: bool,
    pub has_cycling_dynamics: bool,
    pub has_hrv: bool,
    pub total_records: usize,
    pub total_laps: usize,
    pub sport: Option<String>,
    pub device_name: Option<String>,
}

// ============================================================================
// Extraction
// ============================================================================

/// Build a [`ParsedActivity`] from decoded messages.
///
/// Every field of every message is copied verbatim; a kind that is absent
/// from the file yields an empty collection, never an error.
pub fn extract(decoded: &DecodedFit) -> ParsedActivity {
    let collection = |kind: &str| decoded.messages_of(kind).to_vec();
    let first = |kind: &str| {
        decoded
            .messages_of(kind)
            .first()
            .cloned()
            .unwrap_or_default()
    };

    let message_counts = decoded
        .messages
        .iter()
        .map(|(kind, msgs)| (kind.clone(), msgs.len()))
        .collect();

    let activity = ParsedActivity {
        file_info: first(KIND_FILE_ID),
        activity_summary: first(KIND_ACTIVITY),
        device_info: collection(KIND_DEVICE_INFO),
        sessions: collection(KIND_SESSION),
        laps: collection(KIND_LAP),
        records: collection(KIND_RECORD),
        events: collection(KIND_EVENT),
        hrv: collection(KIND_HRV),
        developer_fields: DeveloperFields {
            data_ids: collection(KIND_DEVELOPER_DATA_ID),
            field_descriptions: collection(KIND_FIELD_DESCRIPTION),
        },
        metadata: ActivityMetadata {
            parsed_at: Utc::now(),
            source: decoded.source.clone(),
            file_size_bytes: decoded.file_size_bytes,
            warnings: decoded.warnings.clone(),
            message_counts,
        },
    };

    debug!(
        "[Extractor] {} sessions, {} laps, {} records, {} events",
        activity.sessions.len(),
        activity.laps.len(),
        activity.records.len(),
        activity.events.len()
    );
    activity
}

// ============================================================================
// Diagnostic queries
// ============================================================================

/// Sorted union of field names per message kind.
///
/// Useful for discovering which fields a given device/firmware populates.
pub fn field_report(decoded: &DecodedFit) -> BTreeMap<String, Vec<String>> {
    let mut report = BTreeMap::new();
    for (kind, messages) in &decoded.messages {
        if messages.is_empty() {
            continue;
        }
        let names: BTreeSet<&String> = messages.iter().flat_map(|m| m.keys()).collect();
        report.insert(
            kind.clone(),
            names.into_iter().cloned().collect::<Vec<String>>(),
        );
    }
    report
}

/// Capability summary derived from the unioned record field set plus the
/// session/device messages.
pub fn capability_summary(decoded: &DecodedFit) -> CapabilitySummary {
    let records = decoded.messages_of(KIND_RECORD);
    let record_fields: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();
    let has = |field: &str| record_fields.contains(field);

    CapabilitySummary {
        has_gps: has("position_lat") || has("position_long"),
        has_heart_rate: has("heart_rate"),
        has_power: has("power"),
        has_cadence: has("cadence") || has("fractional_cadence"),
        has_temperature: has("temperature"),
        has_running_dynamics: has("vertical_oscillation") || has("stance_time"),
        has_cycling_dynamics: has("left_torque_effectiveness"),
        has_hrv: !decoded.messages_of(KIND_HRV).is_empty(),
        total_records: records.len(),
        total_laps: decoded.messages_of(KIND_LAP).len(),
        sport: decoded
            .messages_of(KIND_SESSION)
            .first()
            .and_then(|s| s.text("sport")),
        device_name: decoded
            .messages_of(KIND_DEVICE_INFO)
            .first()
            .and_then(|d| d.text("product_name")),
    }
}
