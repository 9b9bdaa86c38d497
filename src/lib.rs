//! # fit-analytics
//!
//! Complete FIT activity file decoding and advanced fitness metrics.
//!
//! This library runs a three-stage pipeline over binary FIT files from GPS
//! sports watches:
//!
//! - **Decode** — validate header and checksums, decode every message,
//!   group by message kind ([`decoder`])
//! - **Extract** — normalize messages into named collections without
//!   dropping a single field ([`extractor`])
//! - **Analyze** — derive heart-rate zones, pace/speed, elevation, running
//!   dynamics, splits, fatigue, efficiency, and a composite performance
//!   score ([`metrics`])
//!
//! Each stage is a pure function of its input and every output is immutable,
//! so many files can be processed in parallel with no locking.
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch analysis with rayon
//!
//! ## Quick Start
//!
//! ```no_run
//! use fit_analytics::analyze_file;
//!
//! let analysis = analyze_file("activity.fit")?;
//! if let Some(stats) = &analysis.metrics.basic_stats {
//!     println!(
//!         "{:?}: {:?} km in {:?}",
//!         stats.sport, stats.distance_km, stats.duration_formatted
//!     );
//! }
//! # Ok::<(), fit_analytics::FitAnalyticsError>(())
//! ```

use std::path::Path;

use serde::Serialize;

// Unified error handling
pub mod error;
pub use error::{FitAnalyticsError, Result};

// Tagged field values and sparse field maps
pub mod value;
pub use value::{FieldMap, FieldValue};

// FIT decoder adapter (header/CRC validation, message grouping)
pub mod decoder;
pub use decoder::{decode_bytes, decode_file, DecodedFit};

// Structured extraction (full-fidelity collections + diagnostics)
pub mod extractor;
pub use extractor::{
    capability_summary, extract, field_report, ActivityMetadata, CapabilitySummary,
    ParsedActivity,
};

// Metrics engine (all derived analytics sections)
pub mod metrics;
pub use metrics::{analyze, MetricsResult};

/// One activity run through the full decode → extract → analyze pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityAnalysis {
    pub activity: ParsedActivity,
    pub metrics: MetricsResult,
}

/// Run the full pipeline over a FIT file on disk.
pub fn analyze_file(path: impl AsRef<Path>) -> Result<ActivityAnalysis> {
    let decoded = decode_file(path)?;
    Ok(analyze_decoded(&decoded))
}

/// Run the full pipeline over FIT bytes already held in memory.
pub fn analyze_bytes(bytes: &[u8]) -> Result<ActivityAnalysis> {
    let decoded = decode_bytes(bytes, None)?;
    Ok(analyze_decoded(&decoded))
}

/// Analyze many files, one independent pipeline per file.
///
/// Each entry of the result corresponds to the path at the same index;
/// a corrupt file fails its own entry without affecting the others.
#[cfg(feature = "parallel")]
pub fn analyze_files(paths: &[std::path::PathBuf]) -> Vec<Result<ActivityAnalysis>> {
    use rayon::prelude::*;

    paths.par_iter().map(|path| analyze_file(path)).collect()
}

fn analyze_decoded(decoded: &DecodedFit) -> ActivityAnalysis {
    let activity = extract(decoded);
    let metrics = analyze(&activity);
    ActivityAnalysis { activity, metrics }
}
