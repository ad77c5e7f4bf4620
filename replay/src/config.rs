//! TOML configuration loading and validation.

use std::path::Path;

use decibook::{BookConfig, Precise};
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::market::MarketPrecision;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub book: BookSection,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub market: Vec<MarketConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookSection {
    /// Levels kept per side
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Skip stale messages; when false a stale message aborts the replay
    #[serde(default = "default_true")]
    pub skip_stale: bool,
}

impl Default for BookSection {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            skip_stale: true,
        }
    }
}

fn default_depth() -> usize {
    100
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Levels printed per side
    #[serde(default = "default_levels")]
    pub levels: usize,
    #[serde(default)]
    pub pad_with_zero: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            pad_with_zero: false,
        }
    }
}

fn default_levels() -> usize {
    5
}

/// Per-market metadata, as an exchange's market loader would provide it.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub symbol: String,
    /// Price tick size as a decimal string, e.g. `"0.01"`
    pub price_tick: Option<Precise>,
    /// Decimal places allowed for amounts
    pub amount_precision: Option<i32>,
    /// Overrides `[book] depth` for this market
    pub depth: Option<usize>,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.book.depth == 0 {
            return Err(Error::Config("book depth must be > 0".into()));
        }

        let mut seen = FxHashSet::default();
        for m in &self.market {
            if m.symbol.is_empty() {
                return Err(Error::Config("empty market symbol".into()));
            }
            if !seen.insert(m.symbol.as_str()) {
                return Err(Error::Config(format!("duplicate market: {}", m.symbol)));
            }
            if let Some(tick) = &m.price_tick {
                if !tick.is_positive() {
                    return Err(Error::Config(format!(
                        "{}: price_tick must be > 0, got {tick}",
                        m.symbol
                    )));
                }
            }
            if m.depth == Some(0) {
                return Err(Error::Config(format!("{}: depth must be > 0", m.symbol)));
            }
        }
        Ok(())
    }

    /// Market metadata for a symbol, if configured.
    pub fn market(&self, symbol: &str) -> Option<&MarketConfig> {
        self.market.iter().find(|m| m.symbol == symbol)
    }

    /// Book settings for a symbol: the market override or the default depth.
    pub fn book_config(&self, symbol: &str) -> BookConfig {
        let depth = self
            .market(symbol)
            .and_then(|m| m.depth)
            .unwrap_or(self.book.depth);
        BookConfig { depth: Some(depth) }
    }

    /// Formatting rules for a symbol. Unknown symbols print values as-is.
    pub fn precision(&self, symbol: &str) -> MarketPrecision {
        match self.market(symbol) {
            Some(m) => MarketPrecision {
                price_tick: m.price_tick.clone(),
                amount_digits: m.amount_precision,
                padding: self.output.pad_with_zero.into(),
            },
            None => MarketPrecision {
                padding: self.output.pad_with_zero.into(),
                ..MarketPrecision::default()
            },
        }
    }
}
