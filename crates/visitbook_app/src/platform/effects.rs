use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use store_logging::{store_debug, store_error, store_warn};
use visitbook_core::{Effect, Msg, SyncError};
use visitbook_store::{
    GuestbookEntry as StoreEntry, RestTableStore, StoreCommand, StoreEvent, StoreHandle,
    StoreSettings,
};

use super::session::SessionStore;

/// Bridges the pure core to the store worker: effects become commands, store
/// events come back as messages. Holds the optional collaborator reference;
/// when it is absent every operation degrades to `NotConfigured`.
pub struct EffectRunner {
    store: Option<Arc<StoreHandle>>,
    session: Arc<dyn SessionStore>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        settings: Option<StoreSettings>,
        session: Arc<dyn SessionStore>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let store = settings.and_then(|settings| match RestTableStore::new(settings) {
            Ok(store) => Some(Arc::new(StoreHandle::new(Arc::new(store)))),
            Err(err) => {
                store_error!("store client unavailable: {err}");
                None
            }
        });
        Self::with_store(store, session, msg_tx)
    }

    /// Seam for tests and alternative collaborators.
    pub fn with_store(
        store: Option<Arc<StoreHandle>>,
        session: Arc<dyn SessionStore>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        if let Some(handle) = &store {
            spawn_event_pump(handle.clone(), msg_tx.clone());
        }
        Self {
            store,
            session,
            msg_tx,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchCount { slug } => match &self.store {
                    Some(handle) => handle.send(StoreCommand::FetchCount { slug }),
                    None => self.reply(Msg::CountFetched {
                        slug,
                        result: Err(SyncError::NotConfigured),
                    }),
                },
                Effect::RecordView { slug, title } => {
                    // The marker is set up front whether or not the store is
                    // reachable, mirroring how the browser sets its session
                    // flag before the increment settles.
                    if !self.session.mark_viewed(&slug) {
                        store_debug!("view already recorded this session slug={slug}");
                    } else if let Some(handle) = &self.store {
                        handle.send(StoreCommand::RecordView { slug, title });
                    } else {
                        store_debug!("store not configured; view for {slug} not recorded");
                    }
                }
                Effect::FetchEntries => match &self.store {
                    Some(handle) => handle.send(StoreCommand::FetchEntries),
                    None => self.reply(Msg::EntriesFetched {
                        result: Err(SyncError::NotConfigured),
                    }),
                },
                Effect::SubmitEntry { name, message } => match &self.store {
                    Some(handle) => handle.send(StoreCommand::SubmitEntry { name, message }),
                    None => self.reply(Msg::EntrySubmitted {
                        result: Err(SyncError::NotConfigured),
                    }),
                },
                Effect::Subscribe => {
                    if let Some(handle) = &self.store {
                        handle.send(StoreCommand::Subscribe);
                    }
                }
                Effect::Unsubscribe => {
                    if let Some(handle) = &self.store {
                        handle.send(StoreCommand::Unsubscribe);
                    }
                }
            }
        }
    }

    fn reply(&self, msg: Msg) {
        let _ = self.msg_tx.send(msg);
    }
}

fn spawn_event_pump(handle: Arc<StoreHandle>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || loop {
        if let Some(event) = handle.try_recv() {
            if msg_tx.send(map_event(event)).is_err() {
                return;
            }
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn map_event(event: StoreEvent) -> Msg {
    match event {
        StoreEvent::CountFetched { slug, result } => Msg::CountFetched {
            slug,
            result: result.map_err(|err| {
                store_warn!("count fetch failed: {err}");
                SyncError::FetchFailed
            }),
        },
        StoreEvent::ViewRecorded { slug, count } => Msg::ViewRecorded { slug, count },
        // Already logged by the worker; the viewer never sees this.
        StoreEvent::ViewRecordFailed { slug, .. } => Msg::ViewRecordFailed { slug },
        StoreEvent::EntriesFetched { result } => Msg::EntriesFetched {
            result: result
                .map(|entries| entries.into_iter().map(map_entry).collect())
                .map_err(|err| {
                    store_warn!("guestbook fetch failed: {err}");
                    SyncError::FetchFailed
                }),
        },
        StoreEvent::EntrySubmitted { result } => Msg::EntrySubmitted {
            result: result.map_err(|err| {
                store_warn!("guestbook submit failed: {err}");
                SyncError::SubmitFailed
            }),
        },
        StoreEvent::EntryInserted => Msg::EntryInserted,
    }
}

fn map_entry(entry: StoreEntry) -> visitbook_core::GuestbookEntry {
    visitbook_core::GuestbookEntry {
        id: entry.id,
        name: entry.name,
        message: entry.message,
        created_at: entry.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    use visitbook_core::{Effect, Msg, SyncError};
    use visitbook_store::{
        GuestbookEntry, NewGuestbookEntry, NewViewRecord, StoreError, StoreHandle, TableStore,
        ViewRecord,
    };

    use super::super::session::MemorySessionStore;
    use super::EffectRunner;

    /// Counts remote mutations; the view-record table is a single slot.
    #[derive(Default)]
    struct CountingStore {
        record: Mutex<Option<ViewRecord>>,
        mutations: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TableStore for CountingStore {
        async fn fetch_view_record(&self, _slug: &str) -> Result<Option<ViewRecord>, StoreError> {
            Ok(self.record.lock().unwrap().clone())
        }

        async fn insert_view_record(&self, record: &NewViewRecord) -> Result<(), StoreError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            *self.record.lock().unwrap() = Some(ViewRecord {
                slug: record.slug.clone(),
                title: record.title.clone(),
                view_count: record.view_count,
            });
            Ok(())
        }

        async fn compare_and_set_count(
            &self,
            _slug: &str,
            expected: u64,
            next: u64,
        ) -> Result<bool, StoreError> {
            let mut record = self.record.lock().unwrap();
            match record.as_mut() {
                Some(record) if record.view_count == expected => {
                    record.view_count = next;
                    self.mutations.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn list_entries(&self) -> Result<Vec<GuestbookEntry>, StoreError> {
            Ok(Vec::new())
        }

        async fn insert_entry(&self, _entry: &NewGuestbookEntry) -> Result<(), StoreError> {
            Ok(())
        }

        async fn latest_entry_id(&self) -> Result<Option<i64>, StoreError> {
            Ok(None)
        }
    }

    fn record_effect(slug: &str) -> Effect {
        Effect::RecordView {
            slug: slug.to_string(),
            title: None,
        }
    }

    #[test]
    fn absent_store_degrades_to_not_configured() {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::with_store(None, Arc::new(MemorySessionStore::new()), msg_tx);

        runner.run(vec![
            Effect::FetchCount {
                slug: "post".to_string(),
            },
            Effect::FetchEntries,
            Effect::SubmitEntry {
                name: "a".to_string(),
                message: "b".to_string(),
            },
        ]);

        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Msg::CountFetched {
                slug: "post".to_string(),
                result: Err(SyncError::NotConfigured),
            }
        );
        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Msg::EntriesFetched {
                result: Err(SyncError::NotConfigured),
            }
        );
        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Msg::EntrySubmitted {
                result: Err(SyncError::NotConfigured),
            }
        );
    }

    #[test]
    fn record_view_without_store_is_silent() {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::with_store(None, Arc::new(MemorySessionStore::new()), msg_tx);

        runner.run(vec![record_effect("post")]);

        assert!(msg_rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn view_recorded_at_most_once_per_session() {
        let store = Arc::new(CountingStore::default());
        let handle = Arc::new(StoreHandle::new(store.clone()));
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::with_store(
            Some(handle),
            Arc::new(MemorySessionStore::new()),
            msg_tx,
        );

        runner.run(vec![record_effect("post")]);
        runner.run(vec![record_effect("post")]);

        assert_eq!(
            msg_rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Msg::ViewRecorded {
                slug: "post".to_string(),
                count: 1,
            }
        );
        // The second run was dropped by the session guard.
        assert!(msg_rx.recv_timeout(Duration::from_millis(300)).is_err());
        assert_eq!(store.mutations.load(Ordering::SeqCst), 1);
    }
}
