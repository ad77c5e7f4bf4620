//! Level: the aggregated size resting at a single price.
//!
//! Two shapes: [`PriceLevel`] is the raw `[price, size(, count)]` row as it
//! arrives from a feed, and [`Level`] is the validated form stored in a book.

use std::fmt;

use crate::{BookError, Precise};

/// One raw row of an order book message.
///
/// Strings are kept exactly as received; validation happens when the row is
/// applied to a book.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceLevel {
    pub price: String,
    pub size: String,
    /// Number of orders at the level, for exchanges that publish it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub count: Option<u64>,
}

impl PriceLevel {
    /// Create a row without an order count.
    pub fn new(price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
            count: None,
        }
    }

    /// Create a row with an order count.
    pub fn counted(price: impl Into<String>, size: impl Into<String>, count: u64) -> Self {
        Self {
            price: price.into(),
            size: size.into(),
            count: Some(count),
        }
    }

    /// Validate the row: both fields must be decimals and the size must not
    /// be negative.
    pub fn parse(&self) -> Result<(Precise, Precise), BookError> {
        let price = self
            .price
            .parse::<Precise>()
            .map_err(|_| BookError::malformed(&self.price, &self.size, "price is not a number"))?;
        let size = self
            .size
            .parse::<Precise>()
            .map_err(|_| BookError::malformed(&self.price, &self.size, "size is not a number"))?;
        if size.is_negative() {
            return Err(BookError::malformed(&self.price, &self.size, "size is negative"));
        }
        Ok((price, size))
    }
}

impl<P: Into<String>, S: Into<String>> From<(P, S)> for PriceLevel {
    fn from((price, size): (P, S)) -> Self {
        PriceLevel::new(price, size)
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            Some(count) => write!(f, "[{}, {}, {}]", self.price, self.size, count),
            None => write!(f, "[{}, {}]", self.price, self.size),
        }
    }
}

/// A validated level resting in a book. Size is always positive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    price: Precise,
    size: Precise,
    count: Option<u64>,
}

impl Level {
    pub(crate) fn new(price: Precise, size: Precise, count: Option<u64>) -> Self {
        debug_assert!(size.is_positive());
        Self { price, size, count }
    }

    /// Returns the price of this level.
    #[inline]
    pub fn price(&self) -> &Precise {
        &self.price
    }

    /// Returns the aggregated size at this level.
    #[inline]
    pub fn size(&self) -> &Precise {
        &self.size
    }

    /// Returns the number of orders, if the feed reports it.
    #[inline]
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// The level as a normalized feed row.
    pub fn to_price_level(&self) -> PriceLevel {
        PriceLevel {
            price: self.price.to_string(),
            size: self.size.to_string(),
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Precise {
        s.parse().unwrap()
    }

    #[test]
    fn parse_valid_row() {
        let row = PriceLevel::new("100.50", "1e-3");
        let (price, size) = row.parse().unwrap();
        assert_eq!(price, p("100.5"));
        assert_eq!(size, p("0.001"));
    }

    #[test]
    fn parse_rejects_bad_price() {
        let err = PriceLevel::new("abc", "1").parse().unwrap_err();
        assert_eq!(err, BookError::malformed("abc", "1", "price is not a number"));
    }

    #[test]
    fn parse_rejects_bad_size() {
        let err = PriceLevel::new("100", "").parse().unwrap_err();
        assert_eq!(err, BookError::malformed("100", "", "size is not a number"));
    }

    #[test]
    fn parse_rejects_negative_size() {
        let err = PriceLevel::new("100", "-1").parse().unwrap_err();
        assert_eq!(err, BookError::malformed("100", "-1", "size is negative"));
    }

    #[test]
    fn zero_size_is_valid() {
        let (_, size) = PriceLevel::new("100", "0.000").parse().unwrap();
        assert!(size.is_zero());
    }

    #[test]
    fn from_tuple() {
        let row: PriceLevel = ("99", "2").into();
        assert_eq!(row, PriceLevel::new("99", "2"));
        assert_eq!(row.count, None);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", PriceLevel::new("1", "2")), "[1, 2]");
        assert_eq!(format!("{}", PriceLevel::counted("1", "2", 3)), "[1, 2, 3]");
    }

    #[test]
    fn level_normalizes_on_export() {
        let level = Level::new(p("100.500"), p("2.0"), Some(4));
        assert_eq!(level.to_price_level(), PriceLevel::counted("100.5", "2", 4));
        assert_eq!(level.count(), Some(4));
    }
}
