//! Visitbook store: table-store client and effect execution.
mod record_view;
mod rest;
mod types;
mod worker;

pub use record_view::{record_view, DEFAULT_TITLE};
pub use rest::{RestTableStore, StoreSettings, TableStore, GUESTBOOK_TABLE, VIEWS_TABLE};
pub use types::{
    GuestbookEntry, NewGuestbookEntry, NewViewRecord, StoreCommand, StoreError, StoreErrorKind,
    StoreEvent, ViewRecord,
};
pub use worker::StoreHandle;
