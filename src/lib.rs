//! # decibook
//!
//! Exact decimal-string arithmetic, exchange precision formatting and
//! incremental order book caches for trading clients.
//!
//! ## Features
//!
//! - **Exact arithmetic**: add, sub, mul, div, mod and comparisons on decimal
//!   strings, backed by arbitrary-precision integers
//! - **Precision formatting**: round or truncate to decimal places,
//!   significant digits or a tick size, with optional zero padding
//! - **Order book cache**: snapshot + delta merging with depth limits and
//!   nonce-based staleness detection
//! - **No floats**: prices and sizes never pass through `f64`
//!
//! ## Quick Start
//!
//! ```
//! use decibook::precise;
//!
//! assert_eq!(precise::string_add("0.1", "0.2").unwrap(), "0.3");
//! assert_eq!(
//!     precise::string_div_to("0.00000002", "69696900000", 20).unwrap(),
//!     "0.00000000000000000028"
//! );
//! assert!(precise::string_gt("1e-3", "0.0009").unwrap());
//! ```
//!
//! ## Precision Formatting
//!
//! | Mode | Precision | `ROUND` | `TRUNCATE` |
//! |------|-----------|---------|------------|
//! | **DecimalPlaces** | `2` | `12.3456` → `12.35` | `12.3456` → `12.34` |
//! | **SignificantDigits** | `4` | `0.000123456` → `0.0001235` | `0.000123456` → `0.0001234` |
//! | **TickSize** | `"110"` | `165` → `220` | `165` → `110` |
//!
//! ```
//! use decibook::{decimal_to_precision, PaddingMode, Precision, PrecisionMode, RoundingMode};
//!
//! let tick: Precision = "0.05".parse().unwrap();
//! let price = decimal_to_precision(
//!     "10.13",
//!     RoundingMode::Round,
//!     tick,
//!     PrecisionMode::TickSize,
//!     PaddingMode::PadWithZero,
//! )
//! .unwrap();
//! assert_eq!(price, "10.15");
//! ```
//!
//! ## Order Books
//!
//! ```
//! use decibook::{BookUpdate, OrderBook, PriceLevel, Side};
//!
//! let mut book = OrderBook::new("BTC/USDT");
//! book.load_snapshot(&BookUpdate::new().nonce(50).bid("100", "1").bid("99", "2"));
//!
//! // size 0 deletes, anything else upserts
//! book.apply_update(&BookUpdate::new().nonce(51).bid("100", "0").bid("98", "5"));
//! assert_eq!(
//!     book.to_sorted_levels(Side::Bid),
//!     vec![PriceLevel::new("99", "2"), PriceLevel::new("98", "5")]
//! );
//!
//! // a message that is not newer than the book is skipped
//! let report = book.apply_update(&BookUpdate::new().nonce(51).bid("99", "0"));
//! assert!(report.skipped_stale);
//! assert_eq!(book.nonce(), Some(51));
//! ```

mod book;
mod book_side;
mod error;
mod level;
pub mod multi_book;
pub mod number;
pub mod precise;
mod result;
mod side;
mod snapshot;
mod types;
mod update;

// Re-export public API
pub use book::{BookConfig, OrderBook};
pub use book_side::OrderBookSide;
pub use error::{BookError, PreciseError};
pub use level::{Level, PriceLevel};
pub use multi_book::OrderBooks;
pub use number::{
    PaddingMode, Precision, PrecisionMode, RoundingMode, decimal_to_precision, format_precise,
    number_to_string, precision_from_string, truncate_to_string,
};
pub use precise::Precise;
pub use result::{BatchReport, DeltaOutcome, RejectedDelta};
pub use side::Side;
pub use snapshot::BookSnapshot;
pub use types::{BookState, Nonce, Timestamp};
pub use update::BookUpdate;
