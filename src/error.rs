//! Unified error handling for the fit-analytics library.
//!
//! Fatal conditions (unreadable file, invalid FIT stream) abort the pipeline
//! for that file. Everything else degrades the output instead: decode
//! warnings accumulate on [`crate::DecodedFit`], and a computation failure is
//! scoped to the single metrics section it occurred in.

use thiserror::Error;

/// Unified error type for fit-analytics operations.
#[derive(Debug, Error)]
pub enum FitAnalyticsError {
    /// The file could not be read at all.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The byte stream is not a decodable FIT file.
    ///
    /// Carries any warnings collected before the failure point so callers
    /// can still surface partial diagnostics for a corrupt upload.
    #[error("invalid FIT file: {message}")]
    InvalidFormat {
        message: String,
        warnings: Vec<String>,
    },

    /// Malformed numeric data reached a statistical function.
    ///
    /// Scoped to a single metrics section; the remaining sections of a
    /// [`crate::MetricsResult`] still complete.
    #[error("metrics section '{section}' failed: {message}")]
    Computation { section: String, message: String },
}

/// Result type alias for fit-analytics operations.
pub type Result<T> = std::result::Result<T, FitAnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_display() {
        let err = FitAnalyticsError::InvalidFormat {
            message: "missing .FIT tag".to_string(),
            warnings: vec!["header CRC mismatch".to_string()],
        };
        assert!(err.to_string().contains("missing .FIT tag"));
    }

    #[test]
    fn test_computation_display_names_section() {
        let err = FitAnalyticsError::Computation {
            section: "heart_rate_analysis".to_string(),
            message: "field 'heart_rate' is not numeric".to_string(),
        };
        assert!(err.to_string().contains("heart_rate_analysis"));
    }
}
