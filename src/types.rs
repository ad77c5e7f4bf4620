//! Core types: Nonce, Timestamp, BookState

use std::fmt;

/// Exchange-assigned sequence number of a book message.
pub type Nonce = u64;

/// Exchange timestamp in milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Lifecycle of one side of a cached book.
///
/// `Empty` until the first snapshot, `SnapshotLoaded` after it, `Live` once
/// incremental deltas flow. A reset goes back to `Empty`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BookState {
    #[default]
    Empty,
    SnapshotLoaded,
    Live,
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookState::Empty => write!(f, "EMPTY"),
            BookState::SnapshotLoaded => write!(f, "SNAPSHOT_LOADED"),
            BookState::Live => write!(f, "LIVE"),
        }
    }
}
