use crate::error::ConvertError;
use crate::rational::{EXIF_DENOMINATOR_LIMIT, Rational};

/// Parse an altitude magnitude and its reference bit into signed metres.
///
/// A reference bit of `0` means below the reference level (negative); any
/// other value means above it.
pub fn parse_altitude(text: &str, reference_bit: i64) -> Result<f64, ConvertError> {
    let magnitude: Rational = text.trim().parse()?;
    let sign = if reference_bit != 0 { 1.0 } else { -1.0 };
    Ok(magnitude.to_f64() * sign)
}

/// Parse the textual value of a reference tag such as `GPSAltitudeRef`.
pub fn parse_reference(text: &str) -> Result<i64, ConvertError> {
    text.trim()
        .parse()
        .map_err(|_| ConvertError::InvalidReference(text.to_string()))
}

/// Split signed metres into the `(magnitude, reference bit)` pair written to EXIF.
///
/// Uses the same bit convention as [`parse_altitude`], so a written value reads
/// back with its sign intact.
pub fn altitude_to_exif(value: f64) -> Result<(Rational, u8), ConvertError> {
    let magnitude = Rational::from_f64(value.abs())
        .ok_or(ConvertError::Range(value))?
        .limit_denominator(EXIF_DENOMINATOR_LIMIT);
    let reference_bit = if value >= 0.0 { 1 } else { 0 };
    Ok((magnitude, reference_bit))
}
