//! Error types for decimal arithmetic, precision formatting and book updates.

/// Errors returned by the decimal arithmetic engine and `decimal_to_precision`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PreciseError {
    /// The input does not match the decimal or exponential grammar.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    /// The divisor of `div` or `rem` is zero-valued.
    #[error("division by zero")]
    DivisionByZero,
    /// The precision argument does not make sense for the counting mode.
    #[error("precision misuse: {0}")]
    PrecisionModeMisuse(String),
}

/// Errors raised while applying a single order book row.
///
/// Book errors are recovered locally: the offending row is skipped and the
/// rest of the batch still applies.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// Non-numeric price or size, or a negative size.
    #[error("malformed delta [{price}, {size}]: {reason}")]
    MalformedDelta {
        price: String,
        size: String,
        reason: String,
    },
}

impl BookError {
    pub(crate) fn malformed(price: &str, size: &str, reason: impl Into<String>) -> Self {
        BookError::MalformedDelta {
            price: price.to_string(),
            size: size.to_string(),
            reason: reason.into(),
        }
    }
}
