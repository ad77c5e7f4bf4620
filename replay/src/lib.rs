//! decibook-replay: offline replay of recorded order book feeds.
//!
//! Reads market settings from a TOML file and book messages from a
//! JSON-lines recording, keeps one cached book per symbol, and prints the
//! resulting top of book with each market's price and amount precision.

pub mod config;
pub mod error;
pub mod feed;
pub mod market;
pub mod replay;
