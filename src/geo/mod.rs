//! Conversions between EXIF GPS encodings and plain numbers.
//!
//! - [`decimal_to_dms`] / [`dms_to_decimal`]: coordinates
//! - [`parse_altitude`] / [`altitude_to_exif`]: altitude and its reference bit

mod altitude;
mod coords;

pub use altitude::{altitude_to_exif, parse_altitude, parse_reference};
pub use coords::{Direction, Dms, MAX_DEGREES, decimal_to_dms, dms_to_decimal};
