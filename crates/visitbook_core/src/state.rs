use crate::view_model::{AppViewModel, CounterView, GuestbookView};
use crate::SyncError;

/// One stored guestbook entry, as held by the core. Immutable once created;
/// ordered by `created_at` descending for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestbookEntry {
    pub id: i64,
    pub name: String,
    pub message: String,
    /// RFC 3339 timestamp assigned by the collaborator.
    pub created_at: String,
}

/// View-counter lifecycle: `Loading -> Loaded | Failed`, with `Loaded`
/// advancing on recorded views. No terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterPhase {
    #[default]
    Idle,
    Loading,
    Loaded(u64),
    Failed(SyncError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CounterState {
    pub(crate) slug: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) phase: CounterPhase,
    /// Last successfully synced count. Kept across fetch failures so the
    /// display never regresses to zero on a transient error.
    pub(crate) count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct GuestbookState {
    pub(crate) open: bool,
    pub(crate) loading: bool,
    pub(crate) entries: Vec<GuestbookEntry>,
    pub(crate) error: Option<SyncError>,
    pub(crate) submitting: bool,
    pub(crate) submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) counter: CounterState,
    pub(crate) guestbook: GuestbookState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let counter = CounterView {
            view_count: self.counter.count,
            loading: matches!(self.counter.phase, CounterPhase::Loading),
            error: match self.counter.phase {
                CounterPhase::Failed(err) => Some(err.user_message()),
                _ => None,
            },
        };
        let guestbook = GuestbookView {
            entries: self.guestbook.entries.clone(),
            loading: self.guestbook.loading,
            error: self.guestbook.error.map(|err| err.user_message()),
            submitting: self.guestbook.submitting,
            submitted: self.guestbook.submitted,
        };
        AppViewModel {
            counter,
            guestbook,
            dirty: self.dirty,
        }
    }

    pub fn counter_phase(&self) -> CounterPhase {
        self.counter.phase
    }

    pub fn is_guestbook_open(&self) -> bool {
        self.guestbook.open
    }

    /// Returns the dirty flag and clears it. The platform uses this to
    /// coalesce rendering.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// True when a counter result belongs to the currently tracked page.
    /// Stale completions for an earlier slug must not mutate state.
    pub(crate) fn counter_tracks(&self, slug: &str) -> bool {
        self.counter.slug.as_deref() == Some(slug)
    }
}
