use crate::{GuestbookEntry, SyncError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A page view component mounted for `slug`.
    CounterOpened {
        slug: String,
        title: Option<String>,
    },
    /// Result of a count lookup. Absent records arrive as `Ok(0)`.
    CountFetched {
        slug: String,
        result: Result<u64, SyncError>,
    },
    /// A view was recorded remotely; `count` is the optimistic new value.
    ViewRecorded { slug: String, count: u64 },
    /// Recording a view failed. Never surfaced to the viewer; the count
    /// simply does not advance.
    ViewRecordFailed { slug: String },
    /// The guestbook component mounted.
    GuestbookOpened,
    /// Result of a full entry-list fetch.
    EntriesFetched {
        result: Result<Vec<GuestbookEntry>, SyncError>,
    },
    /// User submitted the guestbook form (raw, untrimmed input).
    SubmitClicked { name: String, message: String },
    /// Result of storing a new entry.
    EntrySubmitted { result: Result<(), SyncError> },
    /// Change-feed notification: someone inserted an entry.
    EntryInserted,
    /// The guestbook component unmounted.
    GuestbookClosed,
    /// Fallback for placeholder wiring.
    NoOp,
}
