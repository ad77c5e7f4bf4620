//! Precise: exact decimal arithmetic on decimal strings.
//!
//! A [`Precise`] stores a number as an unscaled big integer plus a count of
//! decimal places, so `"0.1"` is `1 × 10⁻¹` and `"1e8"` is `1 × 10⁸`. Values
//! are always kept reduced (no trailing zeros in the unscaled integer), which
//! makes structural equality coincide with numeric equality.
//!
//! Nothing here ever goes through `f64`: inputs and outputs are decimal
//! strings, and every operation is exact except [`Precise::div`], which
//! truncates toward zero at the requested number of decimal places.
//!
//! The `string_*` functions wrap the same operations for callers that only
//! hold strings (prices and sizes lifted straight out of exchange payloads).

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::PreciseError;

/// Decimal places used by [`string_div`] when no precision is given.
pub const DEFAULT_DIV_PRECISION: i64 = 18;

/// Largest exponent (or precision shift) accepted from input.
///
/// Bounds the size of the digit strings an untrusted input can make us render.
pub const MAX_EXPONENT: i64 = 4096;

/// An exact decimal number: `integer × 10^(-decimals)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Precise {
    integer: BigInt,
    decimals: i64,
}

impl Precise {
    /// Zero.
    pub fn zero() -> Self {
        Self {
            integer: BigInt::zero(),
            decimals: 0,
        }
    }

    /// Build from an unscaled integer and a decimal-place count, reducing.
    pub fn from_parts(integer: BigInt, decimals: i64) -> Self {
        if integer.is_zero() {
            return Self::zero();
        }
        let digits = integer.magnitude().to_string();
        let zeros = digits.bytes().rev().take_while(|&b| b == b'0').count();
        if zeros == 0 {
            return Self { integer, decimals };
        }
        Self {
            integer: integer / pow10(zeros as u64),
            decimals: decimals - zeros as i64,
        }
    }

    /// The unscaled integer.
    #[inline]
    pub fn integer(&self) -> &BigInt {
        &self.integer
    }

    /// Decimal places after reduction. Negative for multiples of ten
    /// (`"1200"` has `-2`).
    #[inline]
    pub fn decimals(&self) -> i64 {
        self.decimals
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.integer.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.integer.is_negative()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.integer.is_positive()
    }

    /// True if the value has no fractional part.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.decimals <= 0
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            integer: self.integer.abs(),
            decimals: self.decimals,
        }
    }

    /// Divide, truncating toward zero at `precision` decimal places.
    ///
    /// A negative `precision` truncates to a power of ten
    /// (`69696900000 / 1e8` at `-1` is `690`).
    ///
    /// # Errors
    ///
    /// - [`PreciseError::DivisionByZero`] if `other` is zero.
    /// - [`PreciseError::PrecisionModeMisuse`] if `precision` is beyond
    ///   [`MAX_EXPONENT`] in either direction.
    pub fn div(&self, other: &Precise, precision: i64) -> Result<Precise, PreciseError> {
        if other.is_zero() {
            return Err(PreciseError::DivisionByZero);
        }
        let precision = bounded_exponent(precision)?;
        let distance = precision
            .checked_sub(self.decimals)
            .and_then(|d| d.checked_add(other.decimals))
            .ok_or_else(|| out_of_range(precision))?;
        let scale = checked_pow10(distance.unsigned_abs())?;
        let numerator = match distance.cmp(&0) {
            Ordering::Equal => self.integer.clone(),
            Ordering::Less => &self.integer / scale,
            Ordering::Greater => &self.integer * scale,
        };
        Ok(Self::from_parts(numerator / &other.integer, precision))
    }

    /// Remainder of truncated division; the result carries the sign of `self`.
    pub fn modulo(&self, other: &Precise) -> Result<Precise, PreciseError> {
        if other.is_zero() {
            return Err(PreciseError::DivisionByZero);
        }
        let (a, b, decimals) = self.aligned(other);
        Ok(Self::from_parts(a % b, decimals))
    }

    /// Multiply by `10^exponent` exactly.
    ///
    /// # Errors
    ///
    /// [`PreciseError::PrecisionModeMisuse`] if `exponent` is beyond
    /// [`MAX_EXPONENT`] in either direction.
    pub fn shift(&self, exponent: i64) -> Result<Self, PreciseError> {
        let exponent = bounded_exponent(exponent)?;
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let decimals = self
            .decimals
            .checked_sub(exponent)
            .ok_or_else(|| out_of_range(exponent))?;
        Ok(Self {
            integer: self.integer.clone(),
            decimals,
        })
    }

    /// Both unscaled integers brought to the larger decimal count.
    fn aligned(&self, other: &Precise) -> (BigInt, BigInt, i64) {
        let gap = pow10(self.decimals.abs_diff(other.decimals));
        match self.decimals.cmp(&other.decimals) {
            Ordering::Equal => (self.integer.clone(), other.integer.clone(), self.decimals),
            Ordering::Greater => (self.integer.clone(), &other.integer * gap, self.decimals),
            Ordering::Less => (&self.integer * gap, other.integer.clone(), other.decimals),
        }
    }
}

/// Reject exponents and precisions beyond [`MAX_EXPONENT`].
pub(crate) fn bounded_exponent(value: i64) -> Result<i64, PreciseError> {
    if value.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
        return Err(out_of_range(value));
    }
    Ok(value)
}

fn out_of_range(value: i64) -> PreciseError {
    PreciseError::PrecisionModeMisuse(format!("precision {value} is out of range"))
}

/// `10^n`, or an error if `n` does not fit a `u32` exponent.
fn checked_pow10(n: u64) -> Result<BigInt, PreciseError> {
    let n = u32::try_from(n).map_err(|_| {
        PreciseError::PrecisionModeMisuse(format!("scale 10^{n} is out of range"))
    })?;
    Ok(BigInt::from(10u32).pow(n))
}

/// `10^n` for the scale gap between two values already held.
///
/// Parsing, `div` and `shift` bound their exponents, so a gap past `u32`
/// needs decimals grown by repeated multiplication far beyond any input.
fn pow10(n: u64) -> BigInt {
    BigInt::from(10u32).pow(u32::try_from(n).unwrap_or(u32::MAX))
}

fn parse_exponent(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = s.strip_prefix('+').unwrap_or(s).parse().ok()?;
    (value.abs() <= MAX_EXPONENT).then_some(value)
}

impl FromStr for Precise {
    type Err = PreciseError;

    /// Accepts `-?digits(.digits?)?`, `-?.digits` and an optional
    /// `[eE][+-]?digits` exponent. Trailing dots (`"123."`) are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PreciseError::InvalidNumber(s.to_string());

        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(i) => (
                &unsigned[..i],
                parse_exponent(&unsigned[i + 1..]).ok_or_else(invalid)?,
            ),
            None => (unsigned, 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let integer = if negative { -magnitude } else { magnitude };
        Ok(Self::from_parts(integer, frac_part.len() as i64 - exponent))
    }
}

impl fmt::Display for Precise {
    /// Canonical plain form: no exponent, no trailing fractional zeros,
    /// never `-0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let digits = self.integer.magnitude().to_string();
        if self.decimals <= 0 {
            let zeros = if self.is_zero() { 0 } else { self.decimals.unsigned_abs() as usize };
            return write!(f, "{sign}{digits}{}", "0".repeat(zeros));
        }
        let decimals = self.decimals as usize;
        if digits.len() > decimals {
            let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(decimals - digits.len()))
        }
    }
}

impl Ord for Precise {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.integer.sign(), other.integer.sign());
        if a != b {
            return a.cmp(&b);
        }
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

impl PartialOrd for Precise {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for Precise {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Precise {
    fn from(value: i64) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }
}

impl From<u64> for Precise {
    fn from(value: u64) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }
}

impl From<i32> for Precise {
    fn from(value: i32) -> Self {
        Self::from_parts(BigInt::from(value), 0)
    }
}

impl Add for &Precise {
    type Output = Precise;

    fn add(self, other: &Precise) -> Precise {
        let (a, b, decimals) = self.aligned(other);
        Precise::from_parts(a + b, decimals)
    }
}

impl Sub for &Precise {
    type Output = Precise;

    fn sub(self, other: &Precise) -> Precise {
        let (a, b, decimals) = self.aligned(other);
        Precise::from_parts(a - b, decimals)
    }
}

impl Mul for &Precise {
    type Output = Precise;

    fn mul(self, other: &Precise) -> Precise {
        Precise::from_parts(&self.integer * &other.integer, self.decimals + other.decimals)
    }
}

impl Neg for &Precise {
    type Output = Precise;

    fn neg(self) -> Precise {
        Precise {
            integer: -&self.integer,
            decimals: self.decimals,
        }
    }
}

impl Add for Precise {
    type Output = Precise;

    fn add(self, other: Precise) -> Precise {
        &self + &other
    }
}

impl Sub for Precise {
    type Output = Precise;

    fn sub(self, other: Precise) -> Precise {
        &self - &other
    }
}

impl Mul for Precise {
    type Output = Precise;

    fn mul(self, other: Precise) -> Precise {
        &self * &other
    }
}

impl Neg for Precise {
    type Output = Precise;

    fn neg(self) -> Precise {
        -&self
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Precise {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Precise {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// === String API ===

fn parse(s: &str) -> Result<Precise, PreciseError> {
    s.parse()
}

/// `a + b`.
pub fn string_add(a: &str, b: &str) -> Result<String, PreciseError> {
    Ok((&parse(a)? + &parse(b)?).to_string())
}

/// `a - b`.
pub fn string_sub(a: &str, b: &str) -> Result<String, PreciseError> {
    Ok((&parse(a)? - &parse(b)?).to_string())
}

/// `a * b`.
pub fn string_mul(a: &str, b: &str) -> Result<String, PreciseError> {
    Ok((&parse(a)? * &parse(b)?).to_string())
}

/// `a / b` truncated at [`DEFAULT_DIV_PRECISION`] decimal places.
pub fn string_div(a: &str, b: &str) -> Result<String, PreciseError> {
    string_div_to(a, b, DEFAULT_DIV_PRECISION)
}

/// `a / b` truncated at `precision` decimal places.
pub fn string_div_to(a: &str, b: &str, precision: i64) -> Result<String, PreciseError> {
    Ok(parse(a)?.div(&parse(b)?, precision)?.to_string())
}

/// `a mod b`, with the sign of `a`.
pub fn string_mod(a: &str, b: &str) -> Result<String, PreciseError> {
    Ok(parse(a)?.modulo(&parse(b)?)?.to_string())
}

/// `|a|`.
pub fn string_abs(a: &str) -> Result<String, PreciseError> {
    Ok(parse(a)?.abs().to_string())
}

/// `-a`.
pub fn string_neg(a: &str) -> Result<String, PreciseError> {
    Ok((-parse(a)?).to_string())
}

/// Numeric equality (`"5.534000"` equals `"5.5340"`).
pub fn string_eq(a: &str, b: &str) -> Result<bool, PreciseError> {
    Ok(parse(a)? == parse(b)?)
}

pub fn string_gt(a: &str, b: &str) -> Result<bool, PreciseError> {
    Ok(parse(a)? > parse(b)?)
}

pub fn string_ge(a: &str, b: &str) -> Result<bool, PreciseError> {
    Ok(parse(a)? >= parse(b)?)
}

pub fn string_lt(a: &str, b: &str) -> Result<bool, PreciseError> {
    Ok(parse(a)? < parse(b)?)
}

pub fn string_le(a: &str, b: &str) -> Result<bool, PreciseError> {
    Ok(parse(a)? <= parse(b)?)
}

/// The smaller operand, in canonical form.
pub fn string_min(a: &str, b: &str) -> Result<String, PreciseError> {
    Ok(parse(a)?.min(parse(b)?).to_string())
}

/// The larger operand, in canonical form.
pub fn string_max(a: &str, b: &str) -> Result<String, PreciseError> {
    Ok(parse(a)?.max(parse(b)?).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Precise {
        s.parse().unwrap()
    }

    #[test]
    fn parse_reduces_trailing_zeros() {
        let x = p("1.2300");
        assert_eq!(x.integer(), &BigInt::from(123));
        assert_eq!(x.decimals(), 2);

        let y = p("1200");
        assert_eq!(y.integer(), &BigInt::from(12));
        assert_eq!(y.decimals(), -2);
    }

    #[test]
    fn parse_exponential() {
        assert_eq!(p("1e8").to_string(), "100000000");
        assert_eq!(p("-1.123e-6").to_string(), "-0.000001123");
        assert_eq!(p("2.5E+3").to_string(), "2500");
    }

    #[test]
    fn parse_dot_forms() {
        assert_eq!(p("123.").to_string(), "123");
        assert_eq!(p("0.").to_string(), "0");
        assert_eq!(p(".5").to_string(), "0.5");
        assert_eq!(p("+7").to_string(), "7");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "-", ".", "foo", "1.2.3", "1e", "1e+", "--1", "1 ", " 1", "0x10", "NaN"] {
            assert!(
                matches!(bad.parse::<Precise>(), Err(PreciseError::InvalidNumber(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_rejects_huge_exponent() {
        assert!("1e99999".parse::<Precise>().is_err());
    }

    #[test]
    fn zero_has_no_sign() {
        assert_eq!(p("-0").to_string(), "0");
        assert_eq!(p("-0.000").to_string(), "0");
        assert_eq!(p("-0.0"), p("0"));
        assert!(!p("-0").is_negative());
    }

    #[test]
    fn display_leading_zeros() {
        assert_eq!(p("0.00000002").to_string(), "0.00000002");
        assert_eq!(p("-500.1").to_string(), "-500.1");
        assert_eq!(p("000123.4500").to_string(), "123.45");
    }

    #[test]
    fn ordering_by_value() {
        assert!(p("2") > p("1.9999"));
        assert!(p("-3.1415") < p("-2"));
        assert!(p("3.14150000000000000000001") > p("3.1415"));
        assert_eq!(p("5.534000").cmp(&p("5.5340")), Ordering::Equal);
        assert!(p("-0.1") < p("0"));
    }

    #[test]
    fn operators() {
        assert_eq!((&p("0.1") + &p("0.2")).to_string(), "0.3");
        assert_eq!((p("1") - p("1.5")).to_string(), "-0.5");
        assert_eq!((p("1.5") * p("-2")).to_string(), "-3");
        assert_eq!((-p("0")).to_string(), "0");
    }

    #[test]
    fn div_truncates() {
        assert_eq!(p("1").div(&p("3"), 5).unwrap().to_string(), "0.33333");
        assert_eq!(p("-1").div(&p("3"), 2).unwrap().to_string(), "-0.33");
        assert_eq!(p("2").div(&p("3"), 0).unwrap().to_string(), "0");
    }

    #[test]
    fn div_rejects_out_of_range_precision() {
        for precision in [1i64 << 32, i64::MAX, i64::MIN, MAX_EXPONENT + 1, -MAX_EXPONENT - 1] {
            assert!(
                matches!(p("100").div(&p("3"), precision), Err(PreciseError::PrecisionModeMisuse(_))),
                "{precision}"
            );
        }
        assert_eq!(p("1").div(&p("3"), MAX_EXPONENT).unwrap().decimals(), MAX_EXPONENT);
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(p("1").div(&p("-0.0"), 18), Err(PreciseError::DivisionByZero));
        assert_eq!(p("1").modulo(&p("0")), Err(PreciseError::DivisionByZero));
    }

    #[test]
    fn modulo_keeps_dividend_sign() {
        assert_eq!(p("-7").modulo(&p("3")).unwrap().to_string(), "-1");
        assert_eq!(p("7").modulo(&p("-3")).unwrap().to_string(), "1");
    }

    #[test]
    fn shift_is_exact() {
        assert_eq!(p("123.456").shift(-2).unwrap().to_string(), "1.23456");
        assert_eq!(p("0.5").shift(1).unwrap().to_string(), "5");
        assert_eq!(p("0").shift(5).unwrap().to_string(), "0");
    }

    #[test]
    fn shift_rejects_out_of_range_exponent() {
        assert!(matches!(p("1").shift(MAX_EXPONENT + 1), Err(PreciseError::PrecisionModeMisuse(_))));
        assert!(matches!(p("0").shift(i64::MIN), Err(PreciseError::PrecisionModeMisuse(_))));
        assert_eq!(p("1").shift(-MAX_EXPONENT).unwrap().decimals(), MAX_EXPONENT);
    }

    #[test]
    fn integer_check() {
        assert!(p("1200").is_integer());
        assert!(p("12.000").is_integer());
        assert!(!p("0.1").is_integer());
    }

    #[test]
    fn string_api_propagates_invalid_input() {
        assert!(matches!(
            string_add("1", "x"),
            Err(PreciseError::InvalidNumber(s)) if s == "x"
        ));
        assert!(string_gt("abc", "1").is_err());
    }
}
