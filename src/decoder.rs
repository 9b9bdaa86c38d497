//! FIT Decoder Adapter.
//!
//! Wraps the `fitparser` decoding library. The adapter validates the file
//! header itself, runs the CRC-16 integrity check *before* message decoding,
//! and then decodes with the library's CRC re-validation switched off: a
//! checksum mismatch is reported as a warning rather than a failure, because
//! partially-corrupt files still yield usable messages up to the corruption
//! point. Decoded messages are grouped by kind in file order.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use fitparser::de::{from_bytes_with_options, DecodeOption};
use fitparser::profile::MesgNum;
use log::{debug, warn};

use crate::error::{FitAnalyticsError, Result};
use crate::value::{FieldMap, FieldValue};

/// Legacy header length: size, protocol, profile, data size, ".FIT" tag.
const MIN_HEADER_LEN: usize = 12;
/// Length of a CRC-16 trailer.
const CRC_LEN: usize = 2;

/// Raw decode output: messages grouped by kind, plus integrity diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DecodedFit {
    /// Message kind (snake_case, e.g. `session`, `record`) to the messages
    /// of that kind in file order.
    pub messages: BTreeMap<String, Vec<FieldMap>>,
    /// Non-fatal integrity and decode warnings, in discovery order.
    pub warnings: Vec<String>,
    /// Source path, when decoded from a file.
    pub source: Option<String>,
    /// Size of the decoded byte stream.
    pub file_size_bytes: u64,
}

impl DecodedFit {
    /// Messages of one kind, empty when the file carries none.
    pub fn messages_of(&self, kind: &str) -> &[FieldMap] {
        self.messages.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total decoded message count across all kinds.
    pub fn message_count(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }
}

/// Decode a FIT file from disk.
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedFit> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| FitAnalyticsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_bytes(&bytes, Some(path.display().to_string()))
}

/// Decode a FIT file already held in memory.
pub fn decode_bytes(bytes: &[u8], source: Option<String>) -> Result<DecodedFit> {
    let header = validate_header(bytes)?;
    let warnings = check_integrity(bytes, &header);
    for warning in &warnings {
        warn!("[Decoder] {}", warning);
    }

    // CRC validation already ran above; skipping it here lets the library
    // decode past a bad checksum instead of rejecting the whole file.
    let options: HashSet<DecodeOption> = [
        DecodeOption::SkipHeaderCrcValidation,
        DecodeOption::SkipDataCrcValidation,
    ]
    .into_iter()
    .collect();

    let records = from_bytes_with_options(bytes, &options).map_err(|err| {
        FitAnalyticsError::InvalidFormat {
            message: err.to_string(),
            warnings: warnings.clone(),
        }
    })?;

    let mut messages: BTreeMap<String, Vec<FieldMap>> = BTreeMap::new();
    for record in records {
        let kind = kind_name(record.kind());
        let mut fields = FieldMap::new();
        for field in record.fields() {
            fields.insert(field.name().to_string(), FieldValue::from(field.value().clone()));
        }
        messages.entry(kind).or_default().push(fields);
    }

    let decoded = DecodedFit {
        messages,
        warnings,
        source,
        file_size_bytes: bytes.len() as u64,
    };
    debug!(
        "[Decoder] decoded {} messages across {} kinds ({} warnings)",
        decoded.message_count(),
        decoded.messages.len(),
        decoded.warnings.len()
    );
    Ok(decoded)
}

struct HeaderInfo {
    header_len: usize,
    data_size: usize,
    header_crc: Option<u16>,
}

fn validate_header(bytes: &[u8]) -> Result<HeaderInfo> {
    let invalid = |message: &str| FitAnalyticsError::InvalidFormat {
        message: message.to_string(),
        warnings: Vec::new(),
    };

    let header_len = *bytes.first().ok_or_else(|| invalid("empty input"))? as usize;
    if header_len < MIN_HEADER_LEN {
        return Err(invalid("declared header too small for a FIT file"));
    }
    if bytes.len() < header_len + CRC_LEN {
        return Err(invalid("file shorter than header plus CRC"));
    }
    if &bytes[8..12] != b".FIT" {
        return Err(invalid("missing .FIT marker in header"));
    }

    let data_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let header_crc = if header_len >= MIN_HEADER_LEN + CRC_LEN {
        Some(u16::from_le_bytes([bytes[12], bytes[13]]))
    } else {
        None
    };

    Ok(HeaderInfo {
        header_len,
        data_size,
        header_crc,
    })
}

/// Integrity check over the raw byte stream. Returns warnings instead of
/// failing: the caller decides whether decode can proceed.
fn check_integrity(bytes: &[u8], header: &HeaderInfo) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(stored) = header.header_crc {
        // Zero means the device did not compute a header CRC.
        if stored != 0 && crc16(&bytes[..MIN_HEADER_LEN]) != stored {
            warnings.push("header CRC mismatch".to_string());
        }
    }

    let data_end = header.header_len + header.data_size;
    if bytes.len() < data_end + CRC_LEN {
        warnings.push(format!(
            "file shorter than declared data size ({} of {} bytes)",
            bytes.len(),
            data_end + CRC_LEN
        ));
    } else {
        let stored = u16::from_le_bytes([bytes[data_end], bytes[data_end + 1]]);
        let computed = crc16(&bytes[..data_end]);
        if stored != computed {
            warnings.push(format!(
                "data CRC mismatch (stored {:#06x}, computed {:#06x})",
                stored, computed
            ));
        }
    }

    warnings
}

/// FIT CRC-16 (nibble-table variant used across the format).
///
/// Public so fixtures and diagnostics can stamp or verify byte streams.
pub fn crc16(data: &[u8]) -> u16 {
    const CRC_TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    data.iter().fold(0u16, |crc, byte| {
        let mut tmp = CRC_TABLE[(crc & 0xF) as usize];
        let mut crc = (crc >> 4) & 0x0FFF;
        crc ^= tmp ^ CRC_TABLE[(byte & 0xF) as usize];
        tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize]
    })
}

/// Render a message number as a snake_case kind name
/// (`FileId` -> `file_id`, `UnknownVariant(65280)` -> `unknown_variant_65280`).
fn kind_name(kind: MesgNum) -> String {
    let debug = format!("{:?}", kind);
    let mut name = String::with_capacity(debug.len() + 4);
    for (i, c) in debug.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            name.push(c);
        } else if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_end_matches('_').to_string()
}
