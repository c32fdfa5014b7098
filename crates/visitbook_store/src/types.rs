use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-page view counter row. `slug` is the unique key; `view_count` only
/// ever grows from this client's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub slug: String,
    pub title: String,
    pub view_count: u64,
}

/// Payload for lazily creating a view record on first increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewViewRecord {
    pub slug: String,
    pub title: String,
    pub view_count: u64,
}

/// One guestbook row. `id` and `created_at` are assigned server-side and
/// immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GuestbookEntry {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for signing the guestbook. Fields arrive already trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGuestbookEntry {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    FetchCount { slug: String },
    RecordView { slug: String, title: Option<String> },
    FetchEntries,
    SubmitEntry { name: String, message: String },
    Subscribe,
    Unsubscribe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CountFetched {
        slug: String,
        result: Result<u64, StoreError>,
    },
    ViewRecorded {
        slug: String,
        count: u64,
    },
    ViewRecordFailed {
        slug: String,
        error: StoreError,
    },
    EntriesFetched {
        result: Result<Vec<GuestbookEntry>, StoreError>,
    },
    EntrySubmitted {
        result: Result<(), StoreError>,
    },
    /// Change-feed notification: a new entry appeared on the board.
    EntryInserted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub(crate) fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Timeout,
    Network,
    HttpStatus(u16),
    Decode,
    /// A unique-key insert collided or a conditional update matched no row.
    Conflict,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorKind::Timeout => write!(f, "timeout"),
            StoreErrorKind::Network => write!(f, "network error"),
            StoreErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            StoreErrorKind::Decode => write!(f, "decode error"),
            StoreErrorKind::Conflict => write!(f, "conflict"),
        }
    }
}
