//! Book snapshots for market data consumers.

use crate::{Nonce, OrderBook, Precise, PriceLevel, Timestamp};

/// A point-in-time copy of the top of an order book.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookSnapshot {
    pub symbol: String,
    /// Bid levels (highest price first)
    pub bids: Vec<PriceLevel>,
    /// Ask levels (lowest price first)
    pub asks: Vec<PriceLevel>,
    pub nonce: Option<Nonce>,
    pub timestamp: Option<Timestamp>,
    /// ISO-8601 rendering of `timestamp`
    pub datetime: Option<String>,
}

impl BookSnapshot {
    /// Returns the best bid price, if any.
    pub fn best_bid(&self) -> Option<Precise> {
        self.bids.first().and_then(|l| l.price.parse().ok())
    }

    /// Returns the best ask price, if any.
    pub fn best_ask(&self) -> Option<Precise> {
        self.asks.first().and_then(|l| l.price.parse().ok())
    }

    /// Returns the spread (best ask - best bid), if both exist.
    pub fn spread(&self) -> Option<Precise> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    /// Returns total bid size across the captured levels.
    pub fn total_bid_size(&self) -> Precise {
        total(&self.bids)
    }

    /// Returns total ask size across the captured levels.
    pub fn total_ask_size(&self) -> Precise {
        total(&self.asks)
    }
}

fn total(levels: &[PriceLevel]) -> Precise {
    levels
        .iter()
        .filter_map(|l| l.size.parse::<Precise>().ok())
        .fold(Precise::zero(), |acc, s| acc + s)
}

impl OrderBook {
    /// Take a snapshot of the top N levels on each side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            symbol: self.symbol().to_string(),
            bids: self.bids().top(depth),
            asks: self.asks().top(depth),
            nonce: self.nonce(),
            timestamp: self.timestamp(),
            datetime: self.datetime(),
        }
    }

    /// Take a full snapshot of all levels.
    pub fn full_snapshot(&self) -> BookSnapshot {
        self.snapshot(usize::MAX)
    }
}
