//! JSON-lines feed recordings.
//!
//! One message per line:
//!
//! ```text
//! {"type":"snapshot","symbol":"BTC/USDT","nonce":50,"bids":[["100","1"]],"asks":[[101,2]]}
//! {"type":"delta","symbol":"BTC/USDT","nonce":51,"timestamp":1655395057025,"bids":[["100","0"]]}
//! ```
//!
//! Prices and sizes may be JSON strings or numbers; a third row element is
//! the order count. Blank lines and `#` comments are skipped.

use std::path::Path;

use decibook::{BookUpdate, Nonce, PriceLevel, Timestamp};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Whether a message replaces the book or patches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Snapshot,
    Delta,
}

/// One parsed feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMessage {
    /// 1-based line number in the feed file
    pub line: usize,
    pub kind: MessageKind,
    pub symbol: String,
    pub update: BookUpdate,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    symbol: String,
    nonce: Option<Nonce>,
    timestamp: Option<Timestamp>,
    #[serde(default)]
    bids: Vec<Vec<Value>>,
    #[serde(default)]
    asks: Vec<Vec<Value>>,
}

/// Read every message of a feed file.
pub fn load(path: &Path) -> Result<Vec<FeedMessage>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::FeedRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_str(&contents)
}

/// Parse a whole feed held in memory.
pub fn parse_str(contents: &str) -> Result<Vec<FeedMessage>> {
    let mut messages = Vec::new();
    for (i, text) in contents.lines().enumerate() {
        if let Some(msg) = parse_line(i + 1, text)? {
            messages.push(msg);
        }
    }
    Ok(messages)
}

/// Parse one line; `Ok(None)` for blank and comment lines.
pub fn parse_line(line: usize, text: &str) -> Result<Option<FeedMessage>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let raw: RawMessage =
        serde_json::from_str(text).map_err(|source| Error::FeedParse { line, source })?;
    if raw.symbol.is_empty() {
        return Err(Error::Feed {
            line,
            msg: "empty symbol".into(),
        });
    }

    let update = BookUpdate {
        nonce: raw.nonce,
        timestamp: raw.timestamp,
        bids: rows(line, &raw.bids)?,
        asks: rows(line, &raw.asks)?,
    };
    Ok(Some(FeedMessage {
        line,
        kind: raw.kind,
        symbol: raw.symbol,
        update,
    }))
}

fn rows(line: usize, raw: &[Vec<Value>]) -> Result<Vec<PriceLevel>> {
    raw.iter().map(|row| row_to_level(line, row)).collect()
}

/// `[price, size]` or `[price, size, count]`. Field values are validated
/// later by the book so one bad number only rejects its own row.
fn row_to_level(line: usize, row: &[Value]) -> Result<PriceLevel> {
    let (price, size, count) = match row {
        [price, size] => (price, size, None),
        [price, size, count] => (price, size, Some(count)),
        _ => {
            return Err(Error::Feed {
                line,
                msg: format!("expected [price, size(, count)], got {} elements", row.len()),
            });
        }
    };

    let mut level = PriceLevel::new(value_text(price), value_text(size));
    if let Some(count) = count {
        level.count = Some(count.as_u64().ok_or_else(|| Error::Feed {
            line,
            msg: format!("order count must be a non-negative integer, got {count}"),
        })?);
    }
    Ok(level)
}

/// The decimal text of a JSON scalar, keeping the number exactly as written.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
