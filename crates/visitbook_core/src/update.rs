use crate::state::CounterPhase;
use crate::{AppState, Effect, Msg, SyncError, ValidationError};

/// Maximum displayable characters in a guestbook name, after trimming.
pub const MAX_NAME_CHARS: usize = 20;
/// Maximum displayable characters in a guestbook message, after trimming.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CounterOpened { slug, title } => {
            state.counter.slug = Some(slug.clone());
            state.counter.title = title.clone();
            state.counter.phase = CounterPhase::Loading;
            state.counter.count = 0;
            state.mark_dirty();
            vec![
                Effect::FetchCount { slug: slug.clone() },
                Effect::RecordView { slug, title },
            ]
        }
        Msg::CountFetched { slug, result } => {
            // Stale completion for a previous page; the counter was reopened
            // (or never opened) since this fetch started.
            if !state.counter_tracks(&slug) {
                return (state, Vec::new());
            }
            match result {
                Ok(count) => {
                    // Monotonic: an optimistic bump may already have landed.
                    state.counter.count = state.counter.count.max(count);
                    state.counter.phase = CounterPhase::Loaded(state.counter.count);
                }
                Err(err) => {
                    state.counter.phase = CounterPhase::Failed(err);
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ViewRecorded { slug, count } => {
            if !state.counter_tracks(&slug) {
                return (state, Vec::new());
            }
            state.counter.count = state.counter.count.max(count);
            state.counter.phase = CounterPhase::Loaded(state.counter.count);
            state.mark_dirty();
            Vec::new()
        }
        // Recording failures are logged upstream and never block the viewer;
        // the displayed count simply does not advance.
        Msg::ViewRecordFailed { .. } => Vec::new(),
        Msg::GuestbookOpened => {
            if state.guestbook.open {
                // Already mounted; exactly one subscription per instance.
                return (state, Vec::new());
            }
            state.guestbook.open = true;
            state.guestbook.loading = true;
            state.guestbook.error = None;
            state.guestbook.submitted = false;
            state.mark_dirty();
            vec![Effect::FetchEntries, Effect::Subscribe]
        }
        Msg::EntriesFetched { result } => {
            if !state.guestbook.open {
                return (state, Vec::new());
            }
            state.guestbook.loading = false;
            match result {
                Ok(entries) => {
                    state.guestbook.entries = entries;
                    state.guestbook.error = None;
                }
                // Keep the last successfully fetched list on failure.
                Err(err) => state.guestbook.error = Some(err),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked { name, message } => {
            if state.guestbook.submitting {
                return (state, Vec::new());
            }
            match validate_entry(&name, &message) {
                Ok((name, message)) => {
                    state.guestbook.submitting = true;
                    state.guestbook.submitted = false;
                    state.guestbook.error = None;
                    state.mark_dirty();
                    vec![Effect::SubmitEntry { name, message }]
                }
                Err(err) => {
                    state.guestbook.error = Some(SyncError::Validation(err));
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::EntrySubmitted { result } => {
            if !state.guestbook.submitting {
                return (state, Vec::new());
            }
            state.guestbook.submitting = false;
            state.mark_dirty();
            match result {
                Ok(()) => {
                    state.guestbook.submitted = true;
                    state.guestbook.error = None;
                    // Re-fetch instead of appending locally so the displayed
                    // order matches the collaborator's authoritative order.
                    vec![Effect::FetchEntries]
                }
                Err(err) => {
                    state.guestbook.error = Some(err);
                    Vec::new()
                }
            }
        }
        Msg::EntryInserted => {
            if state.guestbook.open {
                vec![Effect::FetchEntries]
            } else {
                Vec::new()
            }
        }
        Msg::GuestbookClosed => {
            if !state.guestbook.open {
                return (state, Vec::new());
            }
            state.guestbook.open = false;
            state.guestbook.loading = false;
            state.guestbook.submitting = false;
            state.mark_dirty();
            vec![Effect::Unsubscribe]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn validate_entry(name: &str, message: &str) -> Result<(String, String), ValidationError> {
    let name = name.trim();
    let message = message.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if message.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_CHARS,
        });
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong {
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok((name.to_owned(), message.to_owned()))
}
