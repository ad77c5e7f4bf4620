//! Per-market price and amount formatting.

use decibook::{
    PaddingMode, Precise, Precision, PrecisionMode, RoundingMode, decimal_to_precision,
};

use crate::error::Result;

/// How prices and amounts of one market are rendered.
///
/// Prices round to the nearest tick, amounts truncate to a number of
/// decimal places so a formatted amount never exceeds what is available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketPrecision {
    pub price_tick: Option<Precise>,
    pub amount_digits: Option<i32>,
    pub padding: PaddingMode,
}

impl MarketPrecision {
    /// Round a price to the market's tick size.
    pub fn price_to_precision(&self, price: &str) -> Result<String> {
        match &self.price_tick {
            Some(tick) => Ok(decimal_to_precision(
                price,
                RoundingMode::Round,
                Precision::from(tick),
                PrecisionMode::TickSize,
                self.padding,
            )?),
            None => Ok(price.parse::<Precise>()?.to_string()),
        }
    }

    /// Truncate an amount to the market's decimal places.
    pub fn amount_to_precision(&self, amount: &str) -> Result<String> {
        match self.amount_digits {
            Some(digits) => Ok(decimal_to_precision(
                amount,
                RoundingMode::Truncate,
                digits,
                PrecisionMode::DecimalPlaces,
                self.padding,
            )?),
            None => Ok(amount.parse::<Precise>()?.to_string()),
        }
    }
}
