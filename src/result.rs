//! Result types for book operations.

use crate::BookError;

/// What a single delta did to a book side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeltaOutcome {
    /// A new price level was created.
    Inserted,
    /// An existing level's size or count was replaced.
    Updated,
    /// A level was removed by a zero size or zero count.
    Deleted,
    /// A deletion for a price that was not in the book.
    Ignored,
}

/// A row that failed validation, by its position in the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedDelta {
    pub side: crate::Side,
    pub index: usize,
    pub error: BookError,
}

/// Summary of applying a snapshot or a delta batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rows that inserted or updated a level.
    pub applied: usize,
    /// Rows that removed a level.
    pub deleted: usize,
    /// Rows that were no-ops (deleting an absent price).
    pub ignored: usize,
    /// Levels evicted to stay within the depth limit.
    pub evicted: usize,
    /// Malformed rows, skipped.
    pub rejected: Vec<RejectedDelta>,
    /// The whole message was older than the book and nothing changed.
    pub skipped_stale: bool,
}

impl BatchReport {
    /// A report for a message dropped as stale.
    pub fn stale() -> Self {
        Self {
            skipped_stale: true,
            ..Self::default()
        }
    }

    /// Count one delta outcome.
    pub fn record(&mut self, outcome: DeltaOutcome) {
        match outcome {
            DeltaOutcome::Inserted | DeltaOutcome::Updated => self.applied += 1,
            DeltaOutcome::Deleted => self.deleted += 1,
            DeltaOutcome::Ignored => self.ignored += 1,
        }
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: BatchReport) {
        self.applied += other.applied;
        self.deleted += other.deleted;
        self.ignored += other.ignored;
        self.evicted += other.evicted;
        self.rejected.extend(other.rejected);
        self.skipped_stale |= other.skipped_stale;
    }

    /// Returns true if any row was rejected.
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }

    /// Returns true if the book changed.
    pub fn changed_book(&self) -> bool {
        self.applied + self.deleted + self.evicted > 0
    }
}
