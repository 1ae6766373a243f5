//! Error types for coordinate and altitude conversion.

use thiserror::Error;

use crate::rational::ParseRationalError;

/// Validation failures raised by the coordinate and altitude converters.
///
/// These are reported at the point of detection and are never recovered from
/// inside the converter itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The DMS string did not have exactly four whitespace-separated tokens.
    #[error("Bad coordinate format: expected 4 fields, found {found} in {text:?}")]
    Format { text: String, found: usize },

    /// The hemisphere letter was not one of N, S, E, W.
    #[error("Invalid direction: {0:?}")]
    InvalidDirection(String),

    /// A decimal coordinate fell outside [-180, 180].
    #[error("Coordinate out of range: {0}")]
    Range(f64),

    /// A numeric field was not a valid fraction.
    #[error(transparent)]
    InvalidRational(#[from] ParseRationalError),

    /// A reference field (e.g. GPSAltitudeRef) was not an integer.
    #[error("Invalid reference value: {0:?}")]
    InvalidReference(String),
}
