//! Exact fractions for EXIF rational fields.
//!
//! EXIF stores GPS coordinates and altitude as integer ratios. Converting those
//! through `f64` on every step loses precision, so all intermediate arithmetic
//! happens on [`Rational`] and only the final result becomes a float.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg};
use std::str::FromStr;

use thiserror::Error;

/// Largest power-of-two denominator kept by [`Rational::from_f64`].
const MAX_DENOMINATOR_BITS: i32 = 64;

/// EXIF RATIONAL fields are pairs of unsigned 32-bit integers.
pub const EXIF_DENOMINATOR_LIMIT: i128 = u32::MAX as i128;

/// Error returned when text cannot be parsed as a [`Rational`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rational literal: {0:?}")]
pub struct ParseRationalError(pub String);

/// A reduced fraction with a strictly positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// Build a reduced fraction. Returns `None` for a zero denominator and for
    /// `i128::MIN` in either term, which has no positive counterpart.
    pub fn new(num: i128, den: i128) -> Option<Self> {
        if den == 0 || num == i128::MIN || den == i128::MIN {
            return None;
        }
        let (num, den) = if den < 0 {
            (num.checked_neg()?, den.checked_neg()?)
        } else {
            (num, den)
        };
        let g = gcd(num, den);
        Some(Self {
            num: num / g,
            den: den / g,
        })
    }

    pub fn from_integer(value: i128) -> Self {
        Self { num: value, den: 1 }
    }

    pub fn numer(&self) -> i128 {
        self.num
    }

    pub fn denom(&self) -> i128 {
        self.den
    }

    pub fn abs(self) -> Self {
        Self {
            num: self.num.saturating_abs(),
            den: self.den,
        }
    }

    pub fn checked_abs(self) -> Option<Self> {
        Some(Self {
            num: self.num.checked_abs()?,
            den: self.den,
        })
    }

    pub fn to_f64(self) -> f64 {
        // Dividing two large i128 values as f64 each rounds twice; scale the
        // integer part out first so typical EXIF values stay exact.
        let whole = self.num.div_euclid(self.den);
        let rem = self.num.rem_euclid(self.den);
        whole as f64 + rem as f64 / self.den as f64
    }

    /// Exact value of a finite float.
    ///
    /// Every finite `f64` is a dyadic fraction. The conversion is exact as long
    /// as the denominator fits in 2^64; fractional bits below that are rounded
    /// to nearest, which only affects magnitudes under 2^-11. Returns `None`
    /// for NaN, infinities and values too large for the numerator.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        if value == 0.0 {
            return Some(Self::ZERO);
        }

        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased_exp = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1u64 << 52) - 1);

        // value = mantissa * 2^exp
        let (mantissa, exp) = if biased_exp == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased_exp - 1075)
        };

        let mut mantissa = mantissa as i128;
        let rational = if exp >= 0 {
            if exp > 126 - 53 {
                return None;
            }
            Self::from_integer(mantissa << exp)
        } else {
            let mut shift = -exp;
            if shift > MAX_DENOMINATOR_BITS {
                let drop = shift - MAX_DENOMINATOR_BITS;
                mantissa = if drop >= 64 {
                    0
                } else {
                    let half = 1i128 << (drop - 1);
                    (mantissa + half) >> drop
                };
                shift = MAX_DENOMINATOR_BITS;
            }
            Self::new(mantissa, 1i128 << shift)?
        };

        Some(if negative { -rational } else { rational })
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let g = gcd(self.den, rhs.den);
        let lhs_scale = rhs.den / g;
        let rhs_scale = self.den / g;
        let num = self
            .num
            .checked_mul(lhs_scale)?
            .checked_add(rhs.num.checked_mul(rhs_scale)?)?;
        let den = self.den.checked_mul(lhs_scale)?;
        Self::new(num, den)
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        // Cross-reduce before multiplying to keep intermediates small.
        let g1 = gcd(self.num, rhs.den);
        let g2 = gcd(rhs.num, self.den);
        let num = (self.num / g1).checked_mul(rhs.num / g2)?;
        let den = (self.den / g2).checked_mul(rhs.den / g1)?;
        Self::new(num, den)
    }

    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.num == 0 {
            return None;
        }
        self.checked_mul(Self {
            num: rhs.den,
            den: rhs.num,
        }
        .normalized())
    }

    /// Closest fraction whose denominator does not exceed `max_denominator`.
    ///
    /// Walks the continued-fraction expansion and picks between the last
    /// convergent and the best semiconvergent, so ties go to the convergent.
    pub fn limit_denominator(self, max_denominator: i128) -> Self {
        if max_denominator < 1 || self.den <= max_denominator {
            return self;
        }

        let negative = self.num < 0;
        let target = self.abs();

        let (mut p0, mut q0, mut p1, mut q1) = (0i128, 1i128, 1i128, 0i128);
        let (mut n, mut d) = (target.num, target.den);
        loop {
            let a = n / d;
            let q2 = q0 + a * q1;
            if q2 > max_denominator {
                break;
            }
            (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
            (n, d) = (d, n - a * d);
            if d == 0 {
                break;
            }
        }

        let k = (max_denominator - q0) / q1;
        let semi = Self::new(p0 + k * p1, q0 + k * q1).unwrap_or(Self::ZERO);
        let convergent = Self::new(p1, q1).unwrap_or(Self::ZERO);

        let best = if distance(convergent, target) <= distance(semi, target) {
            convergent
        } else {
            semi
        };
        if negative { -best } else { best }
    }

    /// Closest fraction whose numerator and denominator both stay within
    /// `limit` in magnitude. Returns `None` when the value itself is larger
    /// than `limit`.
    pub fn fit_terms(self, limit: i128) -> Option<Self> {
        if limit < 1 {
            return None;
        }
        // |num| = |value| * den, so bounding den by limit / ceil(|value|)
        // bounds the numerator too.
        let whole = self.abs();
        let ceil = whole.num.div_euclid(whole.den) + i128::from(whole.num % whole.den != 0);
        let max_denominator = limit / ceil.max(1);
        if max_denominator < 1 {
            return None;
        }
        let fitted = self.limit_denominator(max_denominator);
        (fitted.num.unsigned_abs() <= limit.unsigned_abs() && fitted.den <= limit).then_some(fitted)
    }

    fn normalized(self) -> Self {
        Self::new(self.num, self.den).unwrap_or(Self::ZERO)
    }
}

/// |a - b| compared without leaving rational space where it fits.
fn distance(a: Rational, b: Rational) -> Rational {
    a.checked_add(-b)
        .map(Rational::abs)
        .unwrap_or_else(|| Rational::from_f64((a.to_f64() - b.to_f64()).abs()).unwrap_or(Rational::ZERO))
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    if a == 0 { 1 } else { a as i128 }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value as i128)
    }
}

impl fmt::Display for Rational {
    /// Always `num/den`, the textual form EXIF tools exchange.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Accepts `n/d`, integers and plain decimals such as `12.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRationalError(s.to_string());
        let text = s.trim();
        if text.is_empty() {
            return Err(err());
        }

        if let Some((num, den)) = text.split_once('/') {
            let num: i128 = num.trim().parse().map_err(|_| err())?;
            let den: i128 = den.trim().parse().map_err(|_| err())?;
            return Self::new(num, den).ok_or_else(err);
        }

        if let Some((whole, frac)) = text.split_once('.') {
            let (negative, whole) = match whole.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, whole.strip_prefix('+').unwrap_or(whole)),
            };
            let digits_ok = |part: &str| part.chars().all(|c| c.is_ascii_digit());
            if (whole.is_empty() && frac.is_empty()) || !digits_ok(whole) || !digits_ok(frac) {
                return Err(err());
            }
            let scale = 10i128.checked_pow(frac.len() as u32).ok_or_else(err)?;
            let whole: i128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| err())? };
            let frac: i128 = if frac.is_empty() { 0 } else { frac.parse().map_err(|_| err())? };
            let num = whole
                .checked_mul(scale)
                .and_then(|w| w.checked_add(frac))
                .ok_or_else(err)?;
            let num = if negative { -num } else { num };
            return Self::new(num, scale).ok_or_else(err);
        }

        let num: i128 = text.parse().map_err(|_| err())?;
        Self::new(num, 1).ok_or_else(err)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.num.checked_mul(other.den), other.num.checked_mul(self.den)) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => self.to_f64().total_cmp(&other.to_f64()),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

// The operators panic on overflow, like the integer operators they mirror.
// Callers handling untrusted input use the `checked_*` forms.

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("rational addition overflowed"),
        }
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        match self.checked_mul(rhs) {
            Some(product) => product,
            None => panic!("rational multiplication overflowed"),
        }
    }
}

impl Div for Rational {
    type Output = Rational;

    fn div(self, rhs: Self) -> Self::Output {
        match self.checked_div(rhs) {
            Some(quotient) => quotient,
            None => panic!("rational division by zero or overflow"),
        }
    }
}
