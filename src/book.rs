//! OrderBook: the cached book for one symbol.
//!
//! Combines:
//! - Bids sorted high → low
//! - Asks sorted low → high
//! - The last applied nonce and exchange timestamp
//!
//! Every inbound message carries an optional nonce. A message whose nonce
//! is not strictly newer than the book's is dropped untouched; there is no
//! rollback. Recovering from gaps is the caller's job: [`OrderBook::reset`]
//! and load a fresh snapshot.

use chrono::{DateTime, SecondsFormat};

use crate::{
    BatchReport, BookError, BookState, BookUpdate, DeltaOutcome, Level, Nonce, OrderBookSide,
    Precise, PriceLevel, Side, Timestamp,
};

/// Per-book settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookConfig {
    /// Maximum levels kept per side, `None` for unbounded.
    pub depth: Option<usize>,
}

/// The cached order book of one symbol.
#[derive(Clone, Debug)]
pub struct OrderBook {
    symbol: String,
    /// Bids, sorted by price descending (best = highest)
    bids: OrderBookSide,
    /// Asks, sorted by price ascending (best = lowest)
    asks: OrderBookSide,
    /// Nonce of the last applied message
    nonce: Option<Nonce>,
    /// Exchange timestamp of the last applied message
    timestamp: Option<Timestamp>,
}

impl OrderBook {
    /// Create a new empty, unbounded order book.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_config(symbol, BookConfig::default())
    }

    /// Create a new empty order book with the given settings.
    pub fn with_config(symbol: impl Into<String>, config: BookConfig) -> Self {
        Self {
            symbol: symbol.into(),
            bids: OrderBookSide::with_depth(Side::Bid, config.depth),
            asks: OrderBookSide::with_depth(Side::Ask, config.depth),
            nonce: None,
            timestamp: None,
        }
    }

    // === Accessors ===

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns a reference to the bid side.
    pub fn bids(&self) -> &OrderBookSide {
        &self.bids
    }

    /// Returns a reference to the ask side.
    pub fn asks(&self) -> &OrderBookSide {
        &self.asks
    }

    /// Returns the given side.
    pub fn side(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut OrderBookSide {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Nonce of the last applied message, if any carried one.
    pub fn nonce(&self) -> Option<Nonce> {
        self.nonce
    }

    /// Exchange timestamp (ms) of the last applied message.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }

    /// The timestamp as ISO-8601 with milliseconds, e.g.
    /// `2022-06-16T15:57:37.025Z`.
    pub fn datetime(&self) -> Option<String> {
        let ms = i64::try_from(self.timestamp?).ok()?;
        DateTime::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// The most advanced state of either side.
    pub fn state(&self) -> BookState {
        self.bids.state().max(self.asks.state())
    }

    pub fn depth(&self) -> Option<usize> {
        self.bids.depth()
    }

    /// Change the depth limit of both sides. Returns the evicted level count.
    pub fn set_depth(&mut self, depth: Option<usize>) -> usize {
        self.bids.set_depth(depth) + self.asks.set_depth(depth)
    }

    // === Top of book ===

    pub fn best_bid(&self) -> Option<&Level> {
        self.bids.best_level()
    }

    pub fn best_ask(&self) -> Option<&Level> {
        self.asks.best_level()
    }

    /// Returns the spread (best ask - best bid), if both exist.
    pub fn spread(&self) -> Option<Precise> {
        Some(self.asks.best_price()? - self.bids.best_price()?)
    }

    /// Returns the exact mid price, if both sides exist.
    pub fn mid_price(&self) -> Option<Precise> {
        let sum = self.asks.best_price()? + self.bids.best_price()?;
        // halving is exact in base ten: x / 2 == x * 5 / 10
        (&sum * &Precise::from(5)).shift(-1).ok()
    }

    /// All levels of one side as normalized rows, best to worst.
    pub fn to_sorted_levels(&self, side: Side) -> Vec<PriceLevel> {
        self.side(side).to_sorted_levels()
    }

    // === Mutation ===

    /// Returns true if a message carrying `nonce` must be skipped.
    pub fn is_stale(&self, nonce: Option<Nonce>) -> bool {
        matches!((nonce, self.nonce), (Some(incoming), Some(current)) if incoming <= current)
    }

    /// Replace both sides with a full snapshot.
    ///
    /// Stale snapshots are skipped like any other message.
    pub fn load_snapshot(&mut self, snapshot: &BookUpdate) -> BatchReport {
        if self.skip_if_stale(snapshot.nonce) {
            return BatchReport::stale();
        }
        let mut report = self.bids.load_snapshot(&snapshot.bids);
        report.merge(self.asks.load_snapshot(&snapshot.asks));
        self.advance(snapshot);
        report
    }

    /// Apply an incremental delta batch to both sides.
    pub fn apply_update(&mut self, update: &BookUpdate) -> BatchReport {
        if self.skip_if_stale(update.nonce) {
            return BatchReport::stale();
        }
        let mut report = BatchReport::default();
        if !update.bids.is_empty() {
            report.merge(self.bids.apply_delta_batch(&update.bids));
        }
        if !update.asks.is_empty() {
            report.merge(self.asks.apply_delta_batch(&update.asks));
        }
        self.advance(update);
        report
    }

    /// Apply one unsequenced delta to a side.
    pub fn apply_delta(&mut self, side: Side, price: &str, size: &str) -> Result<DeltaOutcome, BookError> {
        self.side_mut(side).apply_delta(price, size)
    }

    /// Drop all levels and the nonce, ready for a fresh snapshot.
    pub fn reset(&mut self) {
        log::debug!("{}: reset (last nonce {:?})", self.symbol, self.nonce);
        self.bids.clear();
        self.asks.clear();
        self.nonce = None;
        self.timestamp = None;
    }

    // === Private helpers ===

    fn skip_if_stale(&self, nonce: Option<Nonce>) -> bool {
        let stale = self.is_stale(nonce);
        if stale {
            log::warn!(
                "{}: skipping stale message with nonce {:?} (book at {:?})",
                self.symbol,
                nonce,
                self.nonce
            );
        }
        stale
    }

    fn advance(&mut self, update: &BookUpdate) {
        if update.nonce.is_some() {
            self.nonce = update.nonce;
        }
        if update.timestamp.is_some() {
            self.timestamp = update.timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Precise {
        s.parse().unwrap()
    }

    fn loaded() -> OrderBook {
        let mut book = OrderBook::new("BTC/USDT");
        book.load_snapshot(
            &BookUpdate::new()
                .nonce(50)
                .bid("100", "1")
                .bid("99", "2")
                .ask("101", "1")
                .ask("102", "3"),
        );
        book
    }

    // === Lifecycle ===

    #[test]
    fn new_book_is_empty() {
        let book = OrderBook::new("ETH/BTC");

        assert_eq!(book.symbol(), "ETH/BTC");
        assert_eq!(book.state(), BookState::Empty);
        assert_eq!(book.nonce(), None);
        assert!(book.best_bid().is_none());
        assert_eq!(book.spread(), None);
    }

    #[test]
    fn snapshot_then_deltas() {
        let mut book = loaded();
        assert_eq!(book.state(), BookState::SnapshotLoaded);
        assert_eq!(book.nonce(), Some(50));

        let report = book.apply_update(&BookUpdate::new().nonce(51).bid("100", "0").bid("98", "5"));

        assert_eq!(book.state(), BookState::Live);
        assert_eq!(report.applied, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(
            book.to_sorted_levels(Side::Bid),
            vec![PriceLevel::new("99", "2"), PriceLevel::new("98", "5")]
        );
    }

    // === Nonces ===

    #[test]
    fn equal_nonce_is_stale() {
        let mut book = loaded();
        let before = book.full_snapshot();

        let report = book.apply_update(&BookUpdate::new().nonce(50).bid("100", "0"));

        assert!(report.skipped_stale);
        assert_eq!(book.nonce(), Some(50));
        assert_eq!(book.full_snapshot(), before);
    }

    #[test]
    fn older_snapshot_is_stale() {
        let mut book = loaded();
        let report = book.load_snapshot(&BookUpdate::new().nonce(10).bid("1", "1"));

        assert!(report.skipped_stale);
        assert_eq!(book.best_bid().unwrap().price(), &p("100"));
    }

    #[test]
    fn unsequenced_updates_keep_nonce() {
        let mut book = loaded();
        let report = book.apply_update(&BookUpdate::new().ask("101", "4"));

        assert!(!report.skipped_stale);
        assert_eq!(book.nonce(), Some(50));
        assert_eq!(book.best_ask().unwrap().size(), &p("4"));
    }

    #[test]
    fn reset_accepts_any_nonce() {
        let mut book = loaded();
        book.reset();
        assert_eq!(book.state(), BookState::Empty);
        assert_eq!(book.nonce(), None);

        let report = book.load_snapshot(&BookUpdate::new().nonce(5).ask("7", "1"));
        assert!(!report.skipped_stale);
        assert_eq!(book.nonce(), Some(5));
    }

    #[test]
    fn delta_on_empty_book_goes_live() {
        let mut book = OrderBook::new("X");
        book.apply_update(&BookUpdate::new().bid("1", "1"));
        assert_eq!(book.state(), BookState::Live);
    }

    // === Depth ===

    #[test]
    fn depth_applies_to_both_sides() {
        let mut book = OrderBook::with_config("X", BookConfig { depth: Some(1) });
        book.load_snapshot(&BookUpdate::new().bid("1", "1").bid("2", "1").ask("3", "1").ask("4", "1"));

        assert_eq!(book.to_sorted_levels(Side::Bid), vec![PriceLevel::new("2", "1")]);
        assert_eq!(book.to_sorted_levels(Side::Ask), vec![PriceLevel::new("3", "1")]);
    }

    // === Top of book ===

    #[test]
    fn spread_and_mid_are_exact() {
        let mut book = OrderBook::new("X");
        book.load_snapshot(&BookUpdate::new().bid("0.1", "1").ask("0.25", "1"));

        assert_eq!(book.spread(), Some(p("0.15")));
        assert_eq!(book.mid_price(), Some(p("0.175")));
    }

    #[test]
    fn datetime_renders_millis() {
        let mut book = OrderBook::new("X");
        assert_eq!(book.datetime(), None);

        book.apply_update(&BookUpdate::new().timestamp(1_655_395_057_025));
        assert_eq!(book.timestamp(), Some(1_655_395_057_025));
        assert_eq!(book.datetime().as_deref(), Some("2022-06-16T15:57:37.025Z"));
    }

    #[test]
    fn malformed_rows_reported() {
        let mut book = loaded();
        let report = book.apply_update(&BookUpdate::new().nonce(51).ask("oops", "1").ask("103", "1"));

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.applied, 1);
        assert_eq!(book.asks().level_count(), 3);
        assert_eq!(book.nonce(), Some(51));
    }

    #[test]
    fn single_delta() {
        let mut book = OrderBook::new("X");
        assert_eq!(book.apply_delta(Side::Ask, "5", "1"), Ok(DeltaOutcome::Inserted));
        assert!(book.apply_delta(Side::Ask, "5", "-1").is_err());
    }
}
