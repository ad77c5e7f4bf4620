//! Multi-symbol book cache: one `OrderBook` per symbol.

use crate::{BatchReport, BookConfig, BookUpdate, OrderBook, Precise};
use rustc_hash::FxHashMap;

/// A collection of per-symbol `OrderBook` instances.
///
/// Each symbol gets its own independent book, nonce and depth limit.
///
/// ```
/// use decibook::{BookConfig, BookUpdate, OrderBooks};
///
/// let mut books = OrderBooks::new(BookConfig { depth: Some(25) });
///
/// books.load_snapshot("BTC/USDT", &BookUpdate::new().nonce(1).ask("30000.5", "0.1"));
/// books.load_snapshot("ETH/USDT", &BookUpdate::new().nonce(9).ask("1800", "2"));
///
/// let btc = books.get("BTC/USDT").unwrap();
/// assert_eq!(btc.best_ask().unwrap().price().to_string(), "30000.5");
/// assert_eq!(books.get("ETH/USDT").unwrap().nonce(), Some(9));
/// ```
#[derive(Clone, Debug, Default)]
pub struct OrderBooks {
    books: FxHashMap<String, OrderBook>,
    config: BookConfig,
}

impl OrderBooks {
    /// Create an empty cache; new books get `config`.
    pub fn new(config: BookConfig) -> Self {
        Self {
            books: FxHashMap::default(),
            config,
        }
    }

    /// Get or create the book for a symbol.
    pub fn get_or_create(&mut self, symbol: &str) -> &mut OrderBook {
        let config = self.config;
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| OrderBook::with_config(symbol, config))
    }

    /// Get or create the book for a symbol with its own settings.
    ///
    /// An existing book keeps its levels but adopts the new depth.
    pub fn configure(&mut self, symbol: &str, config: BookConfig) -> &mut OrderBook {
        let book = self
            .books
            .entry(symbol.to_string())
            .or_insert_with(|| OrderBook::with_config(symbol, config));
        if book.depth() != config.depth {
            book.set_depth(config.depth);
        }
        book
    }

    /// Get a reference to the book for a symbol, if it exists.
    pub fn get(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    /// Get a mutable reference to the book for a symbol, if it exists.
    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut OrderBook> {
        self.books.get_mut(symbol)
    }

    /// Load a snapshot into a symbol's book, creating it if needed.
    pub fn load_snapshot(&mut self, symbol: &str, snapshot: &BookUpdate) -> BatchReport {
        self.get_or_create(symbol).load_snapshot(snapshot)
    }

    /// Apply a delta batch to a symbol's book, creating it if needed.
    pub fn apply_update(&mut self, symbol: &str, update: &BookUpdate) -> BatchReport {
        self.get_or_create(symbol).apply_update(update)
    }

    /// Drop a symbol's book (unsubscribe). Returns it if it existed.
    pub fn remove(&mut self, symbol: &str) -> Option<OrderBook> {
        self.books.remove(symbol)
    }

    /// Iterator over all symbols that have books.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Returns true if no books exist.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Best bid and ask for all symbols, sorted by symbol.
    pub fn best_prices(&self) -> Vec<(String, Option<Precise>, Option<Precise>)> {
        let mut prices: Vec<_> = self
            .books
            .iter()
            .map(|(sym, book)| {
                (
                    sym.clone(),
                    book.bids().best_price().cloned(),
                    book.asks().best_price().cloned(),
                )
            })
            .collect();
        prices.sort_by(|a, b| a.0.cmp(&b.0));
        prices
    }
}
