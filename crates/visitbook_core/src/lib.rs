//! Visitbook core: pure state machine and view-model helpers.
mod effect;
mod error;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{SyncError, ValidationError};
pub use msg::Msg;
pub use state::{AppState, CounterPhase, GuestbookEntry};
pub use update::{update, MAX_MESSAGE_CHARS, MAX_NAME_CHARS};
pub use view_model::{AppViewModel, CounterView, GuestbookView};
