//! Precision formatting for decimal strings.
//!
//! [`decimal_to_precision`] is the single funnel every price and amount goes
//! through before it is sent to an exchange. It supports three counting
//! modes:
//!
//! | Mode | `precision` means | Example (`ROUND`) |
//! |------|-------------------|-------------------|
//! | [`PrecisionMode::DecimalPlaces`] | digits after the dot | `12.3456`, 2 → `12.35` |
//! | [`PrecisionMode::SignificantDigits`] | digits from the first non-zero | `0.000123456`, 4 → `0.0001235` |
//! | [`PrecisionMode::TickSize`] | minimum increment | `165`, `110` → `220` |
//!
//! Rounding is half-up (away from zero) decided by the first discarded digit,
//! so `1.45` becomes `1.5` at one place and `1` at zero places. All work is
//! done on digit buffers and [`Precise`] values; floats never appear.

use std::str::FromStr;

use crate::precise::MAX_EXPONENT;
use crate::{Precise, PreciseError};

/// What to do with the digits beyond the precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundingMode {
    /// Half-up, away from zero.
    Round,
    /// Drop the extra digits.
    Truncate,
}

/// How the `precision` argument is counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrecisionMode {
    DecimalPlaces,
    SignificantDigits,
    TickSize,
}

/// Whether to pad the fractional part with zeros up to the precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingMode {
    #[default]
    NoPadding,
    PadWithZero,
}

impl From<bool> for PaddingMode {
    fn from(pad_with_zero: bool) -> Self {
        if pad_with_zero {
            PaddingMode::PadWithZero
        } else {
            PaddingMode::NoPadding
        }
    }
}

/// The `precision` argument: a digit count or a decimal tick size.
///
/// Integers convert directly; strings go through [`FromStr`]:
///
/// ```
/// use decibook::Precision;
///
/// let places = Precision::from(8);
/// let tick: Precision = "0.00000012".parse().unwrap();
/// assert_ne!(places, tick);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Precision {
    Digits(i32),
    Value(Precise),
}

impl Precision {
    /// The precision as a digit count, for the digit-counting modes.
    fn digits(&self) -> Result<i64, PreciseError> {
        let digits = match self {
            Precision::Digits(d) => i64::from(*d),
            Precision::Value(v) if v.is_integer() => v
                .to_string()
                .parse::<i64>()
                .map_err(|_| PreciseError::PrecisionModeMisuse(format!("precision {v} is out of range")))?,
            Precision::Value(v) => {
                return Err(PreciseError::PrecisionModeMisuse(format!(
                    "precision {v} is not a whole number of digits"
                )));
            }
        };
        if digits.abs() > MAX_EXPONENT {
            return Err(PreciseError::PrecisionModeMisuse(format!(
                "precision {digits} is out of range"
            )));
        }
        Ok(digits)
    }

    /// The precision as a tick size.
    fn tick(&self) -> Precise {
        match self {
            Precision::Digits(d) => Precise::from(*d),
            Precision::Value(v) => v.clone(),
        }
    }
}

impl From<i32> for Precision {
    fn from(digits: i32) -> Self {
        Precision::Digits(digits)
    }
}

impl From<Precise> for Precision {
    fn from(value: Precise) -> Self {
        Precision::Value(value)
    }
}

impl From<&Precise> for Precision {
    fn from(value: &Precise) -> Self {
        Precision::Value(value.clone())
    }
}

impl FromStr for Precision {
    type Err = PreciseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Precision::Value)
    }
}

impl TryFrom<&str> for Precision {
    type Error = PreciseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Format `value` to the given precision.
///
/// ```
/// use decibook::{decimal_to_precision, PaddingMode, PrecisionMode, RoundingMode};
///
/// let s = decimal_to_precision(
///     "12.3456",
///     RoundingMode::Truncate,
///     2,
///     PrecisionMode::DecimalPlaces,
///     PaddingMode::NoPadding,
/// )
/// .unwrap();
/// assert_eq!(s, "12.34");
/// ```
///
/// # Errors
///
/// - [`PreciseError::InvalidNumber`] if `value` is not a decimal string.
/// - [`PreciseError::PrecisionModeMisuse`] for a non-positive tick size, or a
///   fractional digit count in the digit-counting modes.
pub fn decimal_to_precision(
    value: &str,
    rounding_mode: RoundingMode,
    precision: impl Into<Precision>,
    precision_mode: PrecisionMode,
    padding_mode: PaddingMode,
) -> Result<String, PreciseError> {
    let value: Precise = value.parse()?;
    format_precise(&value, rounding_mode, &precision.into(), precision_mode, padding_mode)
}

/// [`decimal_to_precision`] on an already parsed value.
pub fn format_precise(
    value: &Precise,
    rounding_mode: RoundingMode,
    precision: &Precision,
    precision_mode: PrecisionMode,
    padding_mode: PaddingMode,
) -> Result<String, PreciseError> {
    if precision_mode == PrecisionMode::TickSize {
        return to_tick_size(value, rounding_mode, &precision.tick(), padding_mode);
    }

    let digits = precision.digits()?;
    if digits < 0 {
        return to_power_of_ten(value, rounding_mode, -digits, padding_mode);
    }
    // no significant digits kept: nothing to round into
    if digits == 0 && precision_mode == PrecisionMode::SignificantDigits {
        return Ok("0".to_string());
    }
    Ok(DigitBuffer::new(value).format(rounding_mode, digits as usize, precision_mode, padding_mode))
}

/// Truncate to `digits` decimal places without padding.
pub fn truncate_to_string(value: &str, digits: i32) -> Result<String, PreciseError> {
    decimal_to_precision(
        value,
        RoundingMode::Truncate,
        digits,
        PrecisionMode::DecimalPlaces,
        PaddingMode::NoPadding,
    )
}

/// Render a float as a plain decimal string (`7.8e-7` → `"0.00000078"`).
///
/// Uses the shortest representation that round-trips, so the result is the
/// decimal the float was written as, not its binary expansion.
pub fn number_to_string(value: f64) -> Result<String, PreciseError> {
    if !value.is_finite() {
        return Err(PreciseError::InvalidNumber(value.to_string()));
    }
    // f64's Display never uses exponent notation
    let plain = format!("{value}");
    Ok(plain.parse::<Precise>()?.to_string())
}

/// Significant fractional digits of a tick-size string (`"0.00010"` → 4).
pub fn precision_from_string(value: &str) -> Result<i32, PreciseError> {
    let value: Precise = value.parse()?;
    // bounded by MAX_EXPONENT plus the fraction length
    Ok(value.decimals().clamp(0, i64::from(i32::MAX)) as i32)
}

/// Round or truncate to a multiple of `tick`.
fn to_tick_size(
    value: &Precise,
    rounding_mode: RoundingMode,
    tick: &Precise,
    padding_mode: PaddingMode,
) -> Result<String, PreciseError> {
    if !tick.is_positive() {
        return Err(PreciseError::PrecisionModeMisuse(format!(
            "tick size must be positive, got {tick}"
        )));
    }

    let missing = value.abs().modulo(tick)?;
    let snapped = if missing.is_zero() {
        value.clone()
    } else {
        let round_up = rounding_mode == RoundingMode::Round && &missing + &missing >= *tick;
        // `missing` is measured on the magnitude, so move toward zero first
        let toward_zero = if value.is_negative() {
            value + &missing
        } else {
            value - &missing
        };
        match (round_up, value.is_negative()) {
            (false, _) => toward_zero,
            (true, false) => &toward_zero + tick,
            (true, true) => &toward_zero - tick,
        }
    };

    let digits = tick.decimals().max(0) as usize;
    Ok(DigitBuffer::new(&snapped).format(
        RoundingMode::Round,
        digits,
        PrecisionMode::DecimalPlaces,
        padding_mode,
    ))
}

/// Negative precision: round or truncate to a multiple of `10^exponent`.
fn to_power_of_ten(
    value: &Precise,
    rounding_mode: RoundingMode,
    exponent: i64,
    padding_mode: PaddingMode,
) -> Result<String, PreciseError> {
    match rounding_mode {
        RoundingMode::Round => {
            let scaled = value.shift(-exponent)?;
            let rounded = DigitBuffer::new(&scaled).format(
                rounding_mode,
                0,
                PrecisionMode::DecimalPlaces,
                padding_mode,
            );
            Ok(rounded.parse::<Precise>()?.shift(exponent)?.to_string())
        }
        RoundingMode::Truncate => {
            let unit = Precise::from(1).shift(exponent)?;
            let floored = value - &value.modulo(&unit)?;
            Ok(DigitBuffer::new(&floored).format(
                rounding_mode,
                0,
                PrecisionMode::DecimalPlaces,
                padding_mode,
            ))
        }
    }
}

/// The digits of a magnitude with a spare leading zero for carries.
///
/// `-123.4567` is held as `0 1 2 3 4 5 6 7` with the dot before index 4.
struct DigitBuffer {
    negative: bool,
    digits: Vec<u8>,
    /// Index of the first fractional digit.
    after_dot: usize,
}

impl DigitBuffer {
    fn new(value: &Precise) -> Self {
        let plain = value.abs().to_string();
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((&plain, ""));

        let mut digits = Vec::with_capacity(1 + int_part.len() + frac_part.len());
        digits.push(0);
        digits.extend(int_part.bytes().map(|b| b - b'0'));
        digits.extend(frac_part.bytes().map(|b| b - b'0'));

        Self {
            negative: value.is_negative(),
            digits,
            after_dot: 1 + int_part.len(),
        }
    }

    /// Index of the first non-zero digit, if any.
    fn first_nonzero(&self) -> Option<usize> {
        self.digits.iter().position(|&d| d != 0)
    }

    /// Index one past the last non-zero digit, if any.
    fn last_nonzero_end(&self) -> Option<usize> {
        self.digits.iter().rposition(|&d| d != 0).map(|i| i + 1)
    }

    /// Zero every digit from `cut` on, carrying into the kept digits when
    /// rounding up.
    fn cut_at(&mut self, cut: usize, rounding_mode: RoundingMode) {
        if cut >= self.digits.len() {
            return;
        }
        let round_up = rounding_mode == RoundingMode::Round && self.digits[cut] >= 5;
        self.digits[cut..].fill(0);
        if !round_up {
            return;
        }
        // cut >= 1 and digits[0] starts at zero, so the carry always lands
        for i in (0..cut).rev() {
            if self.digits[i] == 9 {
                self.digits[i] = 0;
            } else {
                self.digits[i] += 1;
                break;
            }
        }
    }

    fn format(
        mut self,
        rounding_mode: RoundingMode,
        precision: usize,
        precision_mode: PrecisionMode,
        padding_mode: PaddingMode,
    ) -> String {
        let digits_start = self.first_nonzero().unwrap_or(1);
        let precision_start = match precision_mode {
            PrecisionMode::SignificantDigits => digits_start,
            _ => self.after_dot,
        };
        self.cut_at(precision_start + precision, rounding_mode);

        let first = self.first_nonzero();
        let precision_end = match (precision_mode, first) {
            // a carry may have moved the leading digit left
            (PrecisionMode::SignificantDigits, Some(start)) => start + precision,
            _ => precision_start + precision,
        };

        let all_zeros = first.is_none();
        let read_start = match first {
            Some(start) if start < self.after_dot => start,
            _ => self.after_dot - 1,
        };
        let read_end = self
            .last_nonzero_end()
            .filter(|&end| end > self.after_dot)
            .unwrap_or(self.after_dot);

        let actual = read_end - read_start;
        let pad = match padding_mode {
            PaddingMode::NoPadding => 0,
            PaddingMode::PadWithZero => precision_end.saturating_sub(read_start).saturating_sub(actual),
        };

        let mut out = String::with_capacity(actual + pad + 2);
        if self.negative && !all_zeros {
            out.push('-');
        }
        out.extend(self.digits[read_start..self.after_dot].iter().map(|&d| char::from(b'0' + d)));
        if read_end > self.after_dot || pad > 0 {
            out.push('.');
            out.extend(self.digits[self.after_dot..read_end].iter().map(|&d| char::from(b'0' + d)));
            out.extend(std::iter::repeat_n('0', pad));
        }
        out
    }
}
