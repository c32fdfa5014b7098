use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use store_logging::{store_error, store_warn};

use crate::record_view::record_view;
use crate::rest::TableStore;
use crate::{NewGuestbookEntry, StoreCommand, StoreEvent};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Async worker owning the table-store client. Commands go in over a channel
/// and events come back out; a dedicated thread hosts the tokio runtime, so
/// callers on the UI side never block.
pub struct StoreHandle {
    cmd_tx: mpsc::Sender<StoreCommand>,
    event_rx: Mutex<mpsc::Receiver<StoreEvent>>,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self::with_poll_interval(store, DEFAULT_POLL_INTERVAL)
    }

    /// `poll_interval` controls how often the change-feed watcher probes the
    /// board for new entries.
    pub fn with_poll_interval(store: Arc<dyn TableStore>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<StoreCommand>();
        let (event_tx, event_rx) = mpsc::channel::<StoreEvent>();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    store_error!("store worker could not start a runtime: {err}");
                    return;
                }
            };
            let mut watcher: Option<tokio::task::JoinHandle<()>> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    StoreCommand::Subscribe => {
                        // At most one live subscription per handle; a new one
                        // replaces the old watcher.
                        if let Some(task) = watcher.take() {
                            task.abort();
                        }
                        let store = store.clone();
                        let event_tx = event_tx.clone();
                        watcher =
                            Some(runtime.spawn(watch_entries(store, event_tx, poll_interval)));
                    }
                    StoreCommand::Unsubscribe => {
                        if let Some(task) = watcher.take() {
                            task.abort();
                        }
                    }
                    command => {
                        let store = store.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(store, command, event_tx).await;
                        });
                    }
                }
            }

            // Handle dropped: stop the watcher so no event outlives teardown.
            if let Some(task) = watcher.take() {
                task.abort();
            }
        });

        Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        }
    }

    pub fn send(&self, command: StoreCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<StoreEvent> {
        self.event_rx
            .lock()
            .ok()
            .and_then(|rx| rx.try_recv().ok())
    }
}

async fn handle_command(
    store: Arc<dyn TableStore>,
    command: StoreCommand,
    event_tx: mpsc::Sender<StoreEvent>,
) {
    match command {
        StoreCommand::FetchCount { slug } => {
            // An absent record is a zero count, not a failure.
            let result = store
                .fetch_view_record(&slug)
                .await
                .map(|record| record.map_or(0, |record| record.view_count));
            let _ = event_tx.send(StoreEvent::CountFetched { slug, result });
        }
        StoreCommand::RecordView { slug, title } => {
            let event = match record_view(store.as_ref(), &slug, title.as_deref()).await {
                Ok(count) => StoreEvent::ViewRecorded { slug, count },
                Err(error) => {
                    store_warn!("recording view for {slug} failed: {error}");
                    StoreEvent::ViewRecordFailed { slug, error }
                }
            };
            let _ = event_tx.send(event);
        }
        StoreCommand::FetchEntries => {
            let result = store.list_entries().await;
            let _ = event_tx.send(StoreEvent::EntriesFetched { result });
        }
        StoreCommand::SubmitEntry { name, message } => {
            let result = store.insert_entry(&NewGuestbookEntry { name, message }).await;
            let _ = event_tx.send(StoreEvent::EntrySubmitted { result });
        }
        // Subscription lifecycle is handled by the worker loop.
        StoreCommand::Subscribe | StoreCommand::Unsubscribe => {}
    }
}

async fn watch_entries(
    store: Arc<dyn TableStore>,
    event_tx: mpsc::Sender<StoreEvent>,
    poll_interval: Duration,
) {
    // High-water mark; anything above it is a fresh insertion.
    let mut newest = match store.latest_entry_id().await {
        Ok(id) => id,
        Err(err) => {
            store_warn!("change feed initial probe failed: {err}");
            None
        }
    };

    loop {
        tokio::time::sleep(poll_interval).await;
        match store.latest_entry_id().await {
            Ok(latest) => {
                if latest > newest {
                    newest = latest;
                    if event_tx.send(StoreEvent::EntryInserted).is_err() {
                        return;
                    }
                }
            }
            Err(err) => store_warn!("change feed probe failed: {err}"),
        }
    }
}
