//! Text rendering and parsing of EXIF values.
//!
//! Values cross the [`MetadataStore`](crate::store::MetadataStore) boundary as
//! strings in Exiv2's style: ASCII as-is, numbers space separated, rationals
//! as `n/d`. The binary side is `kamadak-exif`'s [`Value`].

use anyhow::{Context, Result, bail};
use exif::Value;
use std::str::FromStr;

use crate::rational::{EXIF_DENOMINATOR_LIMIT, Rational};

/// EXIF field types that can be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl Format {
    /// Type of a decoded value. `None` when the reader did not recognise it.
    pub fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Byte(_) => Self::Byte,
            Value::Ascii(_) => Self::Ascii,
            Value::Short(_) => Self::Short,
            Value::Long(_) => Self::Long,
            Value::Rational(_) => Self::Rational,
            Value::SByte(_) => Self::SByte,
            Value::Undefined(..) => Self::Undefined,
            Value::SShort(_) => Self::SShort,
            Value::SLong(_) => Self::SLong,
            Value::SRational(_) => Self::SRational,
            Value::Float(_) => Self::Float,
            Value::Double(_) => Self::Double,
            Value::Unknown(..) => return None,
        })
    }
}

/// Render a value as text.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Ascii(strings) => strings
            .iter()
            .map(|s| String::from_utf8_lossy(s).trim_end().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Byte(v) | Value::Undefined(v, _) => join(v),
        Value::SByte(v) => join(v),
        Value::Short(v) => join(v),
        Value::SShort(v) => join(v),
        Value::Long(v) => join(v),
        Value::SLong(v) => join(v),
        Value::Rational(v) => v
            .iter()
            .map(|r| format!("{}/{}", r.num, r.denom))
            .collect::<Vec<_>>()
            .join(" "),
        Value::SRational(v) => v
            .iter()
            .map(|r| format!("{}/{}", r.num, r.denom))
            .collect::<Vec<_>>()
            .join(" "),
        Value::Float(v) => join(v),
        Value::Double(v) => join(v),
        Value::Unknown(..) => String::new(),
    }
}

/// Parse `text` as a value of `format`.
pub fn parse_value(format: Format, text: &str) -> Result<Value> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.is_empty() && format != Format::Ascii {
        bail!("Empty value for {format:?} field");
    }

    Ok(match format {
        Format::Ascii => Value::Ascii(vec![text.as_bytes().to_vec()]),
        Format::Byte => Value::Byte(numbers(&parts)?),
        Format::Undefined => Value::Undefined(numbers(&parts)?, 0),
        Format::SByte => Value::SByte(numbers(&parts)?),
        Format::Short => Value::Short(numbers(&parts)?),
        Format::SShort => Value::SShort(numbers(&parts)?),
        Format::Long => Value::Long(numbers(&parts)?),
        Format::SLong => Value::SLong(numbers(&parts)?),
        Format::Rational => Value::Rational(
            parts
                .iter()
                .map(|part| {
                    let (num, denom) = rational_parts(part, EXIF_DENOMINATOR_LIMIT)?;
                    let num = u32::try_from(num)
                        .with_context(|| format!("Negative value {part:?} for unsigned rational"))?;
                    let denom = u32::try_from(denom)?;
                    Ok(exif::Rational { num, denom })
                })
                .collect::<Result<_>>()?,
        ),
        Format::SRational => Value::SRational(
            parts
                .iter()
                .map(|part| {
                    let (num, denom) = rational_parts(part, i32::MAX as i128)?;
                    Ok(exif::SRational {
                        num: i32::try_from(num)?,
                        denom: i32::try_from(denom)?,
                    })
                })
                .collect::<Result<_>>()?,
        ),
        Format::Float => Value::Float(numbers(&parts)?),
        Format::Double => Value::Double(numbers(&parts)?),
    })
}

/// Parse `part` as a rational and fit both of its terms within `limit`.
fn rational_parts(part: &str, limit: i128) -> Result<(i128, i128)> {
    let value: Rational = part.parse()?;
    let fitted = value
        .fit_terms(limit)
        .with_context(|| format!("Rational {part:?} does not fit in an EXIF field"))?;
    Ok((fitted.numer(), fitted.denom()))
}

fn numbers<T: FromStr>(parts: &[&str]) -> Result<Vec<T>> {
    parts
        .iter()
        .map(|part| {
            part.parse()
                .ok()
                .with_context(|| format!("Invalid number {part:?} for this field"))
        })
        .collect()
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(format: Format, text: &str) -> String {
        format_value(&parse_value(format, text).unwrap())
    }

    #[test]
    fn ascii_is_stored_as_one_string() {
        let value = parse_value(Format::Ascii, "Canon").unwrap();
        assert!(matches!(value, Value::Ascii(ref s) if s == &vec![b"Canon".to_vec()]));
        assert_eq!(Format::of(&value), Some(Format::Ascii));
    }

    #[test]
    fn ascii_is_trimmed_on_display() {
        let value = Value::Ascii(vec![b"Nikon  ".to_vec(), Vec::new()]);
        assert_eq!(format_value(&value), "Nikon");
    }

    #[test]
    fn rationals_render_as_fractions() {
        assert_eq!(round_trip(Format::Rational, "84/1 23/1 17/1"), "84/1 23/1 17/1");
        assert_eq!(round_trip(Format::SRational, "-3/2"), "-3/2");
    }

    #[test]
    fn rationals_are_reduced_to_exif_width() {
        assert_eq!(
            round_trip(Format::Rational, "2316898633/536870912"),
            "2316898633/536870912"
        );

        // 2^64 denominators come out of decimal_to_dms and must be squeezed.
        let wide = parse_value(Format::Rational, "1/18446744073709551616").unwrap();
        assert!(matches!(wide, Value::Rational(ref v) if v.len() == 1));
    }

    #[test]
    fn rational_with_wide_numerator_is_fitted() {
        // Seconds of a random coordinate: numerator beyond u32, value < 60.
        let Value::Rational(v) = parse_value(Format::Rational, "124165758197/2147483648").unwrap()
        else {
            panic!("expected a rational");
        };
        let seconds = v[0].num as f64 / v[0].denom as f64;
        assert!((seconds - 124165758197.0 / 2147483648.0).abs() < 1e-6);
    }

    #[test]
    fn oversized_rational_is_rejected() {
        assert!(parse_value(Format::Rational, "8589934592/1").is_err());
        assert!(parse_value(Format::SRational, "4294967296/1").is_err());
    }

    #[test]
    fn unsigned_rational_rejects_negative() {
        assert!(parse_value(Format::Rational, "-1/2").is_err());
    }

    #[test]
    fn integers_round_trip() {
        assert_eq!(round_trip(Format::Short, "6"), "6");
        assert_eq!(round_trip(Format::Byte, "2 2 0 0"), "2 2 0 0");
        assert_eq!(round_trip(Format::Undefined, "48 50 51 48"), "48 50 51 48");
        assert_eq!(round_trip(Format::Long, "4000000000"), "4000000000");
        assert_eq!(round_trip(Format::SShort, "-5"), "-5");
    }

    #[test]
    fn bad_numbers_fail() {
        assert!(parse_value(Format::Short, "").is_err());
        assert!(parse_value(Format::Short, "70000").is_err());
        assert!(parse_value(Format::Byte, "abc").is_err());
        assert!(parse_value(Format::Short, "84/1 23/1 17/1").is_err());
    }

    #[test]
    fn doubles_round_trip() {
        assert_eq!(round_trip(Format::Double, "1.5"), "1.5");
        assert_eq!(round_trip(Format::Double, "-0.25"), "-0.25");
    }

    #[test]
    fn unknown_values_have_no_format() {
        assert_eq!(Format::of(&Value::Unknown(13, 1, 0)), None);
        assert_eq!(format_value(&Value::Unknown(13, 1, 0)), "");
    }
}
