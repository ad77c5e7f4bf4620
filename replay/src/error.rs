//! Error types for the replay tool.

use std::path::PathBuf;

use decibook::PreciseError;

/// All errors that can occur while loading and replaying a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read feed file {path}: {source}")]
    FeedRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("line {line}: invalid JSON: {source}")]
    FeedParse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: {msg}")]
    Feed { line: usize, msg: String },

    #[error("decimal error: {0}")]
    Precise(#[from] PreciseError),
}

pub type Result<T> = std::result::Result<T, Error>;
