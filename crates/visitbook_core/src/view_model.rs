use crate::GuestbookEntry;

/// What a page-view badge renders: `{viewCount, loading, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterView {
    pub view_count: u64,
    pub loading: bool,
    pub error: Option<&'static str>,
}

/// What the guestbook board renders: `{entries, loading, error}` plus the
/// submission flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuestbookView {
    pub entries: Vec<GuestbookEntry>,
    pub loading: bool,
    pub error: Option<&'static str>,
    pub submitting: bool,
    pub submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub counter: CounterView,
    pub guestbook: GuestbookView,
    pub dirty: bool,
}
