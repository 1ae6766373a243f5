use std::fmt;
use std::str::FromStr;

use crate::error::ConvertError;
use crate::rational::{ParseRationalError, Rational};

/// Largest magnitude a decimal coordinate may have.
pub const MAX_DEGREES: f64 = 180.0;

/// Hemisphere letter stored in the `...Ref` companion of a GPS coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// `N` for values ≥ 0, `S` otherwise.
    pub fn for_latitude(value: f64) -> Self {
        if value >= 0.0 { Self::North } else { Self::South }
    }

    /// `E` for values ≥ 0, `W` otherwise.
    pub fn for_longitude(value: f64) -> Self {
        if value >= 0.0 { Self::East } else { Self::West }
    }

    /// Multiplier applied to the DMS magnitude.
    pub fn sign(self) -> f64 {
        match self {
            Self::North | Self::East => 1.0,
            Self::South | Self::West => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Self::North),
            "S" => Ok(Self::South),
            "E" => Ok(Self::East),
            "W" => Ok(Self::West),
            _ => Err(ConvertError::InvalidDirection(s.to_string())),
        }
    }
}

/// An unsigned degrees/minutes/seconds triple.
///
/// The hemisphere is not part of the triple; EXIF stores it in a separate
/// reference tag, so callers pair a `Dms` with a [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dms {
    pub degrees: Rational,
    pub minutes: Rational,
    pub seconds: Rational,
}

impl fmt::Display for Dms {
    /// `"<d>/1 <m>/1 <num>/<den>"`, the value form of EXIF GPS coordinate tags.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.degrees, self.minutes, self.seconds)
    }
}

/// Convert a decimal coordinate to an unsigned DMS triple.
///
/// Degrees and minutes are whole numbers; seconds keep the exact value of the
/// floating-point remainder so the triple converts back without loss.
pub fn decimal_to_dms(value: f64) -> Result<Dms, ConvertError> {
    if !(-MAX_DEGREES..=MAX_DEGREES).contains(&value) {
        return Err(ConvertError::Range(value));
    }

    let total_seconds = value.abs() * 3600.0;
    let seconds = total_seconds % 60.0;
    let total_minutes = ((total_seconds - seconds) / 60.0).round();
    let minutes = total_minutes % 60.0;
    let degrees = ((total_minutes - minutes) / 60.0).round();

    let seconds = Rational::from_f64(seconds).ok_or(ConvertError::Range(value))?;

    Ok(Dms {
        degrees: Rational::from_integer(degrees as i128),
        minutes: Rational::from_integer(minutes as i128),
        seconds,
    })
}

/// Parse `"<deg> <min> <sec> <dir>"` into a signed decimal coordinate.
///
/// Each numeric field is an exact fraction (`84/1`, `17`, `4.5`). Stray signs
/// on the numeric fields are dropped; only the direction decides the sign.
pub fn dms_to_decimal(text: &str) -> Result<f64, ConvertError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != 4 {
        return Err(ConvertError::Format {
            text: text.to_string(),
            found: parts.len(),
        });
    }

    let direction: Direction = parts[3].parse()?;
    let degrees = magnitude_of(parts[0])?;
    let minutes = magnitude_of(parts[1])?;
    let seconds = magnitude_of(parts[2])?;

    let magnitude = exact_magnitude(degrees, minutes, seconds);
    let limit = Rational::from_integer(MAX_DEGREES as i128);
    match magnitude {
        Some(m) if m <= limit => Ok(m.to_f64() * direction.sign()),
        Some(m) => Err(ConvertError::Range(m.to_f64() * direction.sign())),
        // Terms too wide for exact arithmetic still have a usable float value.
        None => {
            let approx = degrees.to_f64() + minutes.to_f64() / 60.0 + seconds.to_f64() / 3600.0;
            if approx <= MAX_DEGREES {
                Ok(approx * direction.sign())
            } else {
                Err(ConvertError::Range(approx * direction.sign()))
            }
        }
    }
}

fn magnitude_of(part: &str) -> Result<Rational, ConvertError> {
    part.parse::<Rational>()?
        .checked_abs()
        .ok_or_else(|| ParseRationalError(part.to_string()).into())
}

fn exact_magnitude(degrees: Rational, minutes: Rational, seconds: Rational) -> Option<Rational> {
    let minutes = minutes.checked_div(Rational::from_integer(60))?;
    let seconds = seconds.checked_div(Rational::from_integer(3600))?;
    degrees.checked_add(minutes)?.checked_add(seconds)
}
