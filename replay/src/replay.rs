//! Applying feed messages to per-symbol books.

use std::fmt::Write as _;

use decibook::{BatchReport, OrderBook, OrderBooks, RejectedDelta};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::{FeedMessage, MessageKind};

/// Counters collected over a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub messages: usize,
    pub snapshots: usize,
    pub deltas: usize,
    pub skipped_stale: usize,
    pub levels_applied: usize,
    pub levels_deleted: usize,
    pub levels_evicted: usize,
    /// Rejected rows with the feed line they came from
    pub rejected: Vec<(usize, RejectedDelta)>,
}

impl ReplaySummary {
    fn record(&mut self, line: usize, report: BatchReport) {
        if report.skipped_stale {
            self.skipped_stale += 1;
        }
        self.levels_applied += report.applied;
        self.levels_deleted += report.deleted;
        self.levels_evicted += report.evicted;
        self.rejected
            .extend(report.rejected.into_iter().map(|r| (line, r)));
    }
}

/// Replays messages into one book per symbol.
#[derive(Debug)]
pub struct Replay<'a> {
    config: &'a Config,
    books: OrderBooks,
    summary: ReplaySummary,
}

impl<'a> Replay<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            books: OrderBooks::default(),
            summary: ReplaySummary::default(),
        }
    }

    /// Apply one message to its symbol's book.
    ///
    /// Stale messages are skipped unless `skip_stale` is off, in which case
    /// they stop the replay.
    pub fn apply(&mut self, msg: &FeedMessage) -> Result<()> {
        if self.books.get(&msg.symbol).is_none() {
            let book_config = self.config.book_config(&msg.symbol);
            self.books.configure(&msg.symbol, book_config);
        }

        let book = self.books.get_or_create(&msg.symbol);
        if !self.config.book.skip_stale && book.is_stale(msg.update.nonce) {
            return Err(Error::Feed {
                line: msg.line,
                msg: format!(
                    "{}: stale nonce {:?}, book at {:?}",
                    msg.symbol,
                    msg.update.nonce,
                    book.nonce()
                ),
            });
        }

        let report = match msg.kind {
            MessageKind::Snapshot => {
                self.summary.snapshots += 1;
                book.load_snapshot(&msg.update)
            }
            MessageKind::Delta => {
                self.summary.deltas += 1;
                book.apply_update(&msg.update)
            }
        };
        self.summary.messages += 1;
        self.summary.record(msg.line, report);
        Ok(())
    }

    /// Apply every message in order.
    pub fn apply_all(&mut self, messages: &[FeedMessage]) -> Result<()> {
        for msg in messages {
            self.apply(msg)?;
        }
        log::info!(
            "replayed {} messages for {} symbols ({} stale, {} rejected rows)",
            self.summary.messages,
            self.books.len(),
            self.summary.skipped_stale,
            self.summary.rejected.len()
        );
        Ok(())
    }

    pub fn books(&self) -> &OrderBooks {
        &self.books
    }

    pub fn summary(&self) -> &ReplaySummary {
        &self.summary
    }

    /// Render every book's top levels with its market's precision, sorted
    /// by symbol.
    pub fn render(&self) -> Result<String> {
        let mut symbols: Vec<&str> = self.books.symbols().collect();
        symbols.sort_unstable();

        let mut out = String::new();
        for symbol in symbols {
            if let Some(book) = self.books.get(symbol) {
                self.render_book(&mut out, book)?;
            }
        }
        Ok(out)
    }

    fn render_book(&self, out: &mut String, book: &OrderBook) -> Result<()> {
        let precision = self.config.precision(book.symbol());
        let snap = book.snapshot(self.config.output.levels);

        let header = match (snap.nonce, snap.datetime.as_deref()) {
            (Some(nonce), Some(dt)) => format!("{} nonce={nonce} {dt}", snap.symbol),
            (Some(nonce), None) => format!("{} nonce={nonce}", snap.symbol),
            (None, Some(dt)) => format!("{} {dt}", snap.symbol),
            (None, None) => snap.symbol.clone(),
        };
        // writing to a String cannot fail
        let _ = writeln!(out, "{header}");

        for level in snap.asks.iter().rev() {
            let _ = writeln!(
                out,
                "  ask {:>16} {:>16}",
                precision.price_to_precision(&level.price)?,
                precision.amount_to_precision(&level.size)?
            );
        }
        match book.spread() {
            Some(spread) => {
                let spread = precision.price_to_precision(&spread.to_string())?;
                let _ = writeln!(out, "  --- spread {spread} ---");
            }
            None => {
                let _ = writeln!(out, "  --- no spread ---");
            }
        }
        for level in &snap.bids {
            let _ = writeln!(
                out,
                "  bid {:>16} {:>16}",
                precision.price_to_precision(&level.price)?,
                precision.amount_to_precision(&level.size)?
            );
        }
        Ok(())
    }
}
