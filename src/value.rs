//! Tagged field values and sparse per-message field maps.
//!
//! FIT payloads are sparse: different manufacturers and firmware revisions
//! populate different field subsets, and new firmware can introduce fields
//! this crate has never seen. Every decoded message is therefore an
//! open-ended `field name -> FieldValue` map, while the statistical helpers
//! downstream require numeric-typed inputs at their boundary.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One decoded message: a sparse mapping from field name to tagged value.
///
/// A `BTreeMap` keeps serialization deterministic, so decoding the same
/// bytes twice yields identical documents.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A single decoded field value.
///
/// Serializes untagged: numbers as numbers, timestamps as RFC 3339 strings,
/// arrays as arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A decoded FIT timestamp, normalized to UTC.
    Timestamp(DateTime<Utc>),
    /// Signed integer value.
    Integer(i64),
    /// Unsigned integer value (also carries raw enum ordinals and bytes).
    UInteger(u64),
    /// Floating point value.
    Float(f64),
    /// String value (including enum variants the profile resolved to names).
    Text(String),
    /// Multi-valued field (e.g. HRV beat-to-beat interval batches).
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Numeric view of the value, if it has one.
    ///
    /// Arrays yield their first numeric element, matching how scalar
    /// consumers read multi-valued FIT fields.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::UInteger(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Array(values) => values.iter().find_map(FieldValue::as_f64),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::UInteger(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Array(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<fitparser::Value> for FieldValue {
    fn from(value: fitparser::Value) -> Self {
        use fitparser::Value;
        match value {
            Value::Timestamp(ts) => FieldValue::Timestamp(ts.with_timezone(&Utc)),
            Value::SInt8(v) => FieldValue::Integer(v.into()),
            Value::SInt16(v) => FieldValue::Integer(v.into()),
            Value::SInt32(v) => FieldValue::Integer(v.into()),
            Value::SInt64(v) => FieldValue::Integer(v),
            Value::UInt8(v) => FieldValue::UInteger(v.into()),
            Value::UInt8z(v) => FieldValue::UInteger(v.into()),
            Value::Byte(v) => FieldValue::UInteger(v.into()),
            Value::Enum(v) => FieldValue::UInteger(v.into()),
            Value::UInt16(v) => FieldValue::UInteger(v.into()),
            Value::UInt16z(v) => FieldValue::UInteger(v.into()),
            Value::UInt32(v) => FieldValue::UInteger(v.into()),
            Value::UInt32z(v) => FieldValue::UInteger(v.into()),
            Value::UInt64(v) => FieldValue::UInteger(v),
            Value::UInt64z(v) => FieldValue::UInteger(v),
            Value::Float32(v) => FieldValue::Float(v.into()),
            Value::Float64(v) => FieldValue::Float(v),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(values) => {
                FieldValue::Array(values.into_iter().map(FieldValue::from).collect())
            }
            #[allow(unreachable_patterns)]
            other => FieldValue::Text(other.to_string()),
        }
    }
}

/// Error raised when a field is present but cannot be read as a finite
/// number — malformed input, not missing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeError {
    pub field: String,
}

impl fmt::Display for FieldTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' is not a finite number", self.field)
    }
}

impl std::error::Error for FieldTypeError {}

/// Extension trait for reading typed values out of a [`FieldMap`].
pub trait FieldMapExt {
    /// Read a numeric field. `Ok(None)` when absent; an error when the field
    /// is present but non-numeric or non-finite.
    fn numeric(&self, field: &str) -> Result<Option<f64>, FieldTypeError>;

    /// The enhanced-field resolution rule: `enhanced_<base>` wins whenever
    /// it is present, otherwise fall back to `<base>`.
    fn prefer_enhanced(&self, base: &str) -> Result<Option<f64>, FieldTypeError>;

    /// First present field from `fields`, read numerically.
    fn first_numeric(&self, fields: &[&str]) -> Result<Option<f64>, FieldTypeError>;

    /// Render a field as text (enum names, sport labels, product names).
    fn text(&self, field: &str) -> Option<String>;

    /// Read a field as a timestamp.
    fn timestamp(&self, field: &str) -> Option<DateTime<Utc>>;
}

impl FieldMapExt for FieldMap {
    fn numeric(&self, field: &str) -> Result<Option<f64>, FieldTypeError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => match value.as_f64() {
                Some(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(FieldTypeError {
                    field: field.to_string(),
                }),
            },
        }
    }

    fn prefer_enhanced(&self, base: &str) -> Result<Option<f64>, FieldTypeError> {
        let enhanced = format!("enhanced_{}", base);
        if self.contains_key(&enhanced) {
            self.numeric(&enhanced)
        } else {
            self.numeric(base)
        }
    }

    fn first_numeric(&self, fields: &[&str]) -> Result<Option<f64>, FieldTypeError> {
        for field in fields {
            if self.contains_key(*field) {
                return self.numeric(field);
            }
        }
        Ok(None)
    }

    fn text(&self, field: &str) -> Option<String> {
        self.get(field).map(|value| value.to_string())
    }

    fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.get(field) {
            Some(FieldValue::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }
}

/// Collect a per-record series for `field`, skipping records where the field
/// is absent or zero. Zero is "no signal" in FIT record streams (a stopped
/// watch still writes zero speed/cadence samples), so it never enters a
/// statistical series.
pub fn numeric_series(records: &[FieldMap], field: &str) -> Result<Vec<f64>, FieldTypeError> {
    let mut series = Vec::new();
    for record in records {
        if let Some(value) = record.numeric(field)? {
            if value != 0.0 {
                series.push(value);
            }
        }
    }
    Ok(series)
}

/// Collect a per-record series for `base`, preferring the nonzero
/// `enhanced_<base>` reading of each record over the plain one.
pub fn enhanced_series(records: &[FieldMap], base: &str) -> Result<Vec<f64>, FieldTypeError> {
    let enhanced = format!("enhanced_{}", base);
    let mut series = Vec::new();
    for record in records {
        let enhanced_value = record.numeric(&enhanced)?.filter(|v| *v != 0.0);
        let base_value = record.numeric(base)?.filter(|v| *v != 0.0);
        if let Some(value) = enhanced_value.or(base_value) {
            series.push(value);
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn map(entries: &[(&str, FieldValue)]) -> FieldMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_numeric_absent_is_none() {
        let m = map(&[]);
        assert_eq!(m.numeric("heart_rate").unwrap(), None);
    }

    #[test]
    fn test_numeric_text_is_error() {
        let m = map(&[("heart_rate", FieldValue::Text("high".to_string()))]);
        let err = m.numeric("heart_rate").unwrap_err();
        assert_eq!(err.field, "heart_rate");
    }

    #[test]
    fn test_numeric_non_finite_is_error() {
        let m = map(&[("altitude", FieldValue::Float(f64::NAN))]);
        assert!(m.numeric("altitude").is_err());
    }

    #[test]
    fn test_prefer_enhanced_wins_when_present() {
        let m = map(&[
            ("avg_speed", FieldValue::Float(2.5)),
            ("enhanced_avg_speed", FieldValue::Float(2.75)),
        ]);
        assert_eq!(m.prefer_enhanced("avg_speed").unwrap(), Some(2.75));
    }

    #[test]
    fn test_prefer_enhanced_falls_back() {
        let m = map(&[("avg_speed", FieldValue::Float(2.5))]);
        assert_eq!(m.prefer_enhanced("avg_speed").unwrap(), Some(2.5));
    }

    #[test]
    fn test_first_numeric_takes_first_present() {
        let m = map(&[("avg_running_cadence", FieldValue::UInteger(172))]);
        assert_eq!(
            m.first_numeric(&["avg_cadence", "avg_running_cadence"])
                .unwrap(),
            Some(172.0)
        );
    }

    #[test]
    fn test_numeric_series_skips_absent_and_zero() {
        let records = vec![
            map(&[("heart_rate", FieldValue::UInteger(140))]),
            map(&[]),
            map(&[("heart_rate", FieldValue::UInteger(0))]),
            map(&[("heart_rate", FieldValue::UInteger(150))]),
        ];
        assert_eq!(
            numeric_series(&records, "heart_rate").unwrap(),
            vec![140.0, 150.0]
        );
    }

    #[test]
    fn test_enhanced_series_prefers_nonzero_enhanced() {
        let records = vec![
            map(&[
                ("speed", FieldValue::Float(2.0)),
                ("enhanced_speed", FieldValue::Float(2.5)),
            ]),
            // Zero enhanced reading falls back to the plain field.
            map(&[
                ("speed", FieldValue::Float(3.0)),
                ("enhanced_speed", FieldValue::Float(0.0)),
            ]),
            map(&[("enhanced_speed", FieldValue::Float(4.0))]),
            map(&[("speed", FieldValue::Float(0.0))]),
        ];
        assert_eq!(
            enhanced_series(&records, "speed").unwrap(),
            vec![2.5, 3.0, 4.0]
        );
    }

    #[test]
    fn test_timestamp_serializes_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
        let json = serde_json::to_string(&FieldValue::Timestamp(ts)).unwrap();
        assert!(json.starts_with("\"2024-03-09T08:30:00"), "got {}", json);
    }

    #[test]
    fn test_array_numeric_takes_first_element() {
        let value = FieldValue::Array(vec![
            FieldValue::Float(0.82),
            FieldValue::Float(0.79),
        ]);
        assert_eq!(value.as_f64(), Some(0.82));
    }
}
