//! Inbound book messages.

use crate::{Nonce, PriceLevel, Timestamp};

/// One snapshot or delta message for a single symbol.
///
/// Built field by field, the way a feed handler extracts them:
///
/// ```
/// use decibook::BookUpdate;
///
/// let update = BookUpdate::new()
///     .nonce(51)
///     .timestamp(1_655_395_057_025)
///     .bid("100", "0")
///     .ask("101.5", "2.25");
///
/// assert_eq!(update.bids.len(), 1);
/// assert_eq!(update.nonce, Some(51));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookUpdate {
    pub nonce: Option<Nonce>,
    pub timestamp: Option<Timestamp>,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl BookUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn bid(mut self, price: impl Into<String>, size: impl Into<String>) -> Self {
        self.bids.push(PriceLevel::new(price, size));
        self
    }

    pub fn ask(mut self, price: impl Into<String>, size: impl Into<String>) -> Self {
        self.asks.push(PriceLevel::new(price, size));
        self
    }

    pub fn counted_bid(mut self, price: impl Into<String>, size: impl Into<String>, count: u64) -> Self {
        self.bids.push(PriceLevel::counted(price, size, count));
        self
    }

    pub fn counted_ask(mut self, price: impl Into<String>, size: impl Into<String>, count: u64) -> Self {
        self.asks.push(PriceLevel::counted(price, size, count));
        self
    }

    /// Total number of rows on both sides.
    pub fn row_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }
}
