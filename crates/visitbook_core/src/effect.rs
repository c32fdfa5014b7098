#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Look up the current view count for a page.
    FetchCount { slug: String },
    /// Record one view for a page. The platform applies the session-once
    /// guard before any remote call.
    RecordView { slug: String, title: Option<String> },
    /// Re-fetch the full guestbook entry list.
    FetchEntries,
    /// Store a new guestbook entry (fields already trimmed and validated).
    SubmitEntry { name: String, message: String },
    /// Start listening for guestbook insertions.
    Subscribe,
    /// Release the change-feed subscription.
    Unsubscribe,
}
