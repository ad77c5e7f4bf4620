//! OrderBookSide: one side of a cached order book (bids or asks).
//!
//! Levels are keyed by their exact decimal price in a `BTreeMap`, so every
//! upsert or delete is O(log n) and iteration is always sorted. The depth
//! limit is enforced after each mutation by evicting from the worst end.

use std::collections::BTreeMap;

use crate::{
    BatchReport, BookError, BookState, DeltaOutcome, Level, Precise, PriceLevel, RejectedDelta,
    Side,
};

/// One side of the order book (all bids or all asks).
///
/// - **Bids**: best = highest price, evicts lowest first
/// - **Asks**: best = lowest price, evicts highest first
#[derive(Clone, Debug)]
pub struct OrderBookSide {
    /// Price levels, sorted ascending by numeric price
    levels: BTreeMap<Precise, Level>,
    /// Which side this represents (determines "best" direction)
    side: Side,
    /// Maximum number of levels kept, `None` for unbounded
    depth: Option<usize>,
    state: BookState,
}

impl OrderBookSide {
    /// Create a new empty, unbounded side.
    pub fn new(side: Side) -> Self {
        Self::with_depth(side, None)
    }

    /// Create a new empty side keeping at most `depth` levels.
    pub fn with_depth(side: Side, depth: Option<usize>) -> Self {
        Self {
            levels: BTreeMap::new(),
            side,
            depth,
            state: BookState::Empty,
        }
    }

    /// Returns which side this collection represents.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the depth limit.
    #[inline]
    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Returns the lifecycle state.
    #[inline]
    pub fn state(&self) -> BookState {
        self.state
    }

    /// Returns true if there are no levels on this side.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the number of distinct price levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Returns the best price (highest for bids, lowest for asks).
    pub fn best_price(&self) -> Option<&Precise> {
        self.best_level().map(Level::price)
    }

    /// Returns the best level.
    pub fn best_level(&self) -> Option<&Level> {
        match self.side {
            Side::Bid => self.levels.values().next_back(),
            Side::Ask => self.levels.values().next(),
        }
    }

    /// Returns the level at the given price, if it exists.
    pub fn get_level(&self, price: &Precise) -> Option<&Level> {
        self.levels.get(price)
    }

    /// Change the depth limit, evicting levels if the side is now too deep.
    ///
    /// Returns the number of evicted levels.
    pub fn set_depth(&mut self, depth: Option<usize>) -> usize {
        self.depth = depth;
        self.truncate()
    }

    /// Replace every level with the given rows.
    ///
    /// Zero-size rows are dropped and malformed rows are reported and
    /// skipped. The side ends up `SnapshotLoaded` whatever its prior state.
    pub fn load_snapshot(&mut self, levels: &[PriceLevel]) -> BatchReport {
        self.levels.clear();
        let mut report = self.apply_rows(levels);
        report.evicted += self.truncate();
        self.state = BookState::SnapshotLoaded;
        log::debug!(
            "{} snapshot loaded: {} levels, {} rejected",
            self.side,
            self.levels.len(),
            report.rejected.len()
        );
        report
    }

    /// Upsert or delete the level at `price`.
    ///
    /// A zero `size` removes the level (no-op if absent).
    pub fn apply_delta(&mut self, price: &str, size: &str) -> Result<DeltaOutcome, BookError> {
        self.apply_level(&PriceLevel::new(price, size))
    }

    /// Like [`apply_delta`](Self::apply_delta) with an order count. A zero
    /// count removes the level whatever the size.
    pub fn apply_counted_delta(
        &mut self,
        price: &str,
        size: &str,
        count: u64,
    ) -> Result<DeltaOutcome, BookError> {
        self.apply_level(&PriceLevel::counted(price, size, count))
    }

    /// Apply one row, then re-truncate to the depth limit.
    pub fn apply_level(&mut self, row: &PriceLevel) -> Result<DeltaOutcome, BookError> {
        let outcome = self.upsert(row)?;
        self.truncate();
        self.state = BookState::Live;
        Ok(outcome)
    }

    /// Apply rows in order; for a repeated price the last row wins.
    ///
    /// Malformed rows are reported and skipped, the rest still apply.
    pub fn apply_delta_batch(&mut self, deltas: &[PriceLevel]) -> BatchReport {
        let mut report = self.apply_rows(deltas);
        report.evicted += self.truncate();
        self.state = BookState::Live;
        report
    }

    /// All levels as normalized rows, best to worst.
    pub fn to_sorted_levels(&self) -> Vec<PriceLevel> {
        self.top(usize::MAX)
    }

    /// The best `n` levels as normalized rows.
    pub fn top(&self, n: usize) -> Vec<PriceLevel> {
        self.iter_best_to_worst()
            .take(n)
            .map(Level::to_price_level)
            .collect()
    }

    /// Returns an iterator over levels from best to worst price.
    ///
    /// - Bids: highest to lowest
    /// - Asks: lowest to highest
    pub fn iter_best_to_worst(&self) -> impl Iterator<Item = &Level> {
        BestToWorstIter {
            inner: if self.side == Side::Bid {
                IterDirection::Reverse(self.levels.values().rev())
            } else {
                IterDirection::Forward(self.levels.values())
            },
        }
    }

    /// Returns the total size across all levels.
    pub fn total_size(&self) -> Precise {
        self.levels
            .values()
            .fold(Precise::zero(), |acc, l| &acc + l.size())
    }

    /// Drop every level and return to `Empty`.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.state = BookState::Empty;
    }

    // === Private helpers ===

    fn apply_rows(&mut self, rows: &[PriceLevel]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, row) in rows.iter().enumerate() {
            match self.upsert(row) {
                Ok(outcome) => report.record(outcome),
                Err(error) => {
                    log::warn!("{} row {index} rejected: {error}", self.side);
                    report.rejected.push(RejectedDelta {
                        side: self.side,
                        index,
                        error,
                    });
                }
            }
        }
        report
    }

    fn upsert(&mut self, row: &PriceLevel) -> Result<DeltaOutcome, BookError> {
        let (price, size) = row.parse()?;
        let delete = size.is_zero() || row.count == Some(0);

        let outcome = if delete {
            match self.levels.remove(&price) {
                Some(_) => DeltaOutcome::Deleted,
                None => DeltaOutcome::Ignored,
            }
        } else {
            let level = Level::new(price.clone(), size, row.count);
            match self.levels.insert(price, level) {
                Some(_) => DeltaOutcome::Updated,
                None => DeltaOutcome::Inserted,
            }
        };
        log::trace!("{} {row}: {outcome:?}", self.side);
        Ok(outcome)
    }

    /// Evict the least competitive levels beyond the depth limit.
    fn truncate(&mut self) -> usize {
        let Some(depth) = self.depth else {
            return 0;
        };
        let mut evicted = 0;
        while self.levels.len() > depth {
            match self.side {
                Side::Bid => self.levels.pop_first(),
                Side::Ask => self.levels.pop_last(),
            };
            evicted += 1;
        }
        evicted
    }
}

/// Direction wrapper for the iterator.
enum IterDirection<F, R> {
    Forward(F),
    Reverse(R),
}

type ValuesIter<'a> = std::collections::btree_map::Values<'a, Precise, Level>;

/// Iterator that yields levels from best to worst price.
struct BestToWorstIter<'a> {
    inner: IterDirection<ValuesIter<'a>, std::iter::Rev<ValuesIter<'a>>>,
}

impl<'a> Iterator for BestToWorstIter<'a> {
    type Item = &'a Level;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterDirection::Forward(iter) => iter.next(),
            IterDirection::Reverse(iter) => iter.next(),
        }
    }
}
