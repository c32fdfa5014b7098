use std::sync::Once;

use visitbook_core::{
    update, AppState, Effect, GuestbookEntry, Msg, SyncError, ValidationError, MAX_NAME_CHARS,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(store_logging::initialize_for_tests);
}

fn entry(id: i64, name: &str, created_at: &str) -> GuestbookEntry {
    GuestbookEntry {
        id,
        name: name.to_string(),
        message: format!("message from {name}"),
        created_at: created_at.to_string(),
    }
}

fn open(state: AppState) -> AppState {
    update(state, Msg::GuestbookOpened).0
}

#[test]
fn opening_fetches_and_subscribes() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::GuestbookOpened);

    assert!(state.is_guestbook_open());
    assert!(state.view().guestbook.loading);
    assert_eq!(effects, vec![Effect::FetchEntries, Effect::Subscribe]);
}

#[test]
fn reopening_does_not_subscribe_twice() {
    init_logging();
    let state = open(AppState::new());
    let (_, effects) = update(state, Msg::GuestbookOpened);

    assert!(effects.is_empty());
}

#[test]
fn entries_keep_newest_first_order() {
    init_logging();
    let newest_first = vec![
        entry(3, "carol", "2026-08-03T10:00:00Z"),
        entry(2, "bob", "2026-08-02T10:00:00Z"),
        entry(1, "alice", "2026-08-01T10:00:00Z"),
    ];
    let state = open(AppState::new());
    let (state, _) = update(
        state,
        Msg::EntriesFetched {
            result: Ok(newest_first.clone()),
        },
    );

    let view = state.view();
    assert!(!view.guestbook.loading);
    assert_eq!(view.guestbook.entries, newest_first);
}

#[test]
fn empty_fields_rejected_before_any_effect() {
    init_logging();
    let state = open(AppState::new());

    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            name: "   ".to_string(),
            message: "hello".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().guestbook.error,
        Some(SyncError::Validation(ValidationError::EmptyName).user_message())
    );

    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            name: "name".to_string(),
            message: "".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().guestbook.error,
        Some(SyncError::Validation(ValidationError::EmptyMessage).user_message())
    );
}

#[test]
fn overlong_name_rejected() {
    init_logging();
    let state = open(AppState::new());
    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            name: "x".repeat(MAX_NAME_CHARS + 1),
            message: "hi".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.view().guestbook.error,
        Some(SyncError::Validation(ValidationError::NameTooLong { max: MAX_NAME_CHARS }).user_message())
    );
}

#[test]
fn submitted_fields_are_trimmed() {
    init_logging();
    let state = open(AppState::new());
    let (state, effects) = update(
        state,
        Msg::SubmitClicked {
            name: " Alice ".to_string(),
            message: " Hi ".to_string(),
        },
    );

    assert!(state.view().guestbook.submitting);
    assert_eq!(
        effects,
        vec![Effect::SubmitEntry {
            name: "Alice".to_string(),
            message: "Hi".to_string(),
        }]
    );
}

#[test]
fn successful_submit_refetches_instead_of_appending() {
    init_logging();
    let state = open(AppState::new());
    let (state, _) = update(
        state,
        Msg::SubmitClicked {
            name: "Alice".to_string(),
            message: "Hi".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::EntrySubmitted { result: Ok(()) });

    let view = state.view();
    assert!(view.guestbook.submitted);
    assert!(!view.guestbook.submitting);
    assert!(view.guestbook.entries.is_empty());
    assert_eq!(effects, vec![Effect::FetchEntries]);
}

#[test]
fn submit_failure_keeps_last_entries() {
    init_logging();
    let existing = vec![entry(1, "alice", "2026-08-01T10:00:00Z")];
    let state = open(AppState::new());
    let (state, _) = update(
        state,
        Msg::EntriesFetched {
            result: Ok(existing.clone()),
        },
    );
    let (state, _) = update(
        state,
        Msg::SubmitClicked {
            name: "Bob".to_string(),
            message: "Hey".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::EntrySubmitted {
            result: Err(SyncError::SubmitFailed),
        },
    );

    let view = state.view();
    assert_eq!(view.guestbook.entries, existing);
    assert_eq!(view.guestbook.error, Some(SyncError::SubmitFailed.user_message()));
    assert!(effects.is_empty());
}

#[test]
fn insert_notification_triggers_refetch_while_open() {
    init_logging();
    let state = open(AppState::new());
    let (state, effects) = update(state, Msg::EntryInserted);
    assert_eq!(effects, vec![Effect::FetchEntries]);

    let (state, effects) = update(state, Msg::GuestbookClosed);
    assert_eq!(effects, vec![Effect::Unsubscribe]);

    let (_, effects) = update(state, Msg::EntryInserted);
    assert!(effects.is_empty());
}

#[test]
fn results_after_close_do_not_mutate_state() {
    init_logging();
    let state = open(AppState::new());
    let (mut state, _) = update(state, Msg::GuestbookClosed);
    assert!(state.consume_dirty());

    let (mut state, effects) = update(
        state,
        Msg::EntriesFetched {
            result: Ok(vec![entry(1, "late", "2026-08-01T10:00:00Z")]),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    assert!(state.view().guestbook.entries.is_empty());
}

#[test]
fn fetch_failure_sets_error_and_keeps_list() {
    init_logging();
    let existing = vec![entry(1, "alice", "2026-08-01T10:00:00Z")];
    let state = open(AppState::new());
    let (state, _) = update(
        state,
        Msg::EntriesFetched {
            result: Ok(existing.clone()),
        },
    );
    let (state, _) = update(
        state,
        Msg::EntriesFetched {
            result: Err(SyncError::FetchFailed),
        },
    );

    let view = state.view();
    assert_eq!(view.guestbook.entries, existing);
    assert_eq!(view.guestbook.error, Some(SyncError::FetchFailed.user_message()));
}
