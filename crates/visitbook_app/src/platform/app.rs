use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use clap::Parser;
use store_logging::store_info;
use visitbook_core::{update, AppState, AppViewModel, Msg};

use super::cli::{Cli, Command, GuestbookCommand};
use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::session::MemorySessionStore;

const POLL: Duration = Duration::from_millis(25);
/// How long a command waits for the remote state to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);
/// Grace period after the count loads so an in-flight view record can land.
const RECORD_GRACE: Duration = Duration::from_millis(1500);

pub fn run() {
    let cli = Cli::parse();
    logging::initialize(cli.log);

    let settings = config::store_settings_from_env();
    if settings.is_none() {
        store_info!("persistence collaborator not configured; running degraded");
    }

    let (msg_tx, msg_rx) = mpsc::channel();
    let session = Arc::new(MemorySessionStore::new());
    let runner = EffectRunner::new(settings, session, msg_tx);
    let mut driver = Driver {
        state: AppState::new(),
        runner,
        msg_rx,
    };

    match cli.command {
        Command::View { slug, title } => run_view(&mut driver, slug, title),
        Command::Guestbook(GuestbookCommand::List) => run_list(&mut driver),
        Command::Guestbook(GuestbookCommand::Sign { name, message }) => {
            run_sign(&mut driver, name, message)
        }
        Command::Guestbook(GuestbookCommand::Watch { seconds }) => {
            run_watch(&mut driver, Duration::from_secs(seconds))
        }
    }
}

struct Driver {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
}

impl Driver {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Pumps messages until `done` reports the view settled or the deadline
    /// passes. Returns the final view model.
    fn drive_until(
        &mut self,
        deadline: Duration,
        done: impl Fn(&AppViewModel) -> bool,
    ) -> AppViewModel {
        let started = Instant::now();
        loop {
            if let Ok(msg) = self.msg_rx.recv_timeout(POLL) {
                self.dispatch(msg);
            }
            let view = self.state.view();
            if done(&view) || started.elapsed() > deadline {
                return view;
            }
        }
    }
}

fn run_view(driver: &mut Driver, slug: String, title: Option<String>) {
    driver.dispatch(Msg::CounterOpened {
        slug: slug.clone(),
        title,
    });
    driver.drive_until(SETTLE_TIMEOUT, |view| !view.counter.loading);
    // Let the optimistic record land before printing.
    let view = driver.drive_until(RECORD_GRACE, |_| false);

    match view.counter.error {
        Some(message) => println!("{slug}: {message}"),
        None => println!("{slug}: {} views", view.counter.view_count),
    }
}

fn run_list(driver: &mut Driver) {
    driver.dispatch(Msg::GuestbookOpened);
    let view = driver.drive_until(SETTLE_TIMEOUT, |view| !view.guestbook.loading);
    driver.dispatch(Msg::GuestbookClosed);

    print_board(&view);
}

fn run_sign(driver: &mut Driver, name: String, message: String) {
    driver.dispatch(Msg::GuestbookOpened);
    driver.dispatch(Msg::SubmitClicked { name, message });
    let view = driver.drive_until(SETTLE_TIMEOUT, |view| {
        view.guestbook.submitted || view.guestbook.error.is_some()
    });
    driver.dispatch(Msg::GuestbookClosed);

    match view.guestbook.error {
        Some(message) => println!("{message}"),
        None => println!("Thanks for signing the guestbook!"),
    }
}

fn run_watch(driver: &mut Driver, duration: Duration) {
    driver.dispatch(Msg::GuestbookOpened);
    let view = driver.drive_until(SETTLE_TIMEOUT, |view| !view.guestbook.loading);
    driver.state.consume_dirty();
    print_board(&view);

    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if let Ok(msg) = driver.msg_rx.recv_timeout(POLL) {
            driver.dispatch(msg);
        }
        if driver.state.consume_dirty() {
            print_board(&driver.state.view());
        }
    }
    driver.dispatch(Msg::GuestbookClosed);
}

fn print_board(view: &AppViewModel) {
    if let Some(message) = view.guestbook.error {
        println!("{message}");
        return;
    }
    if view.guestbook.entries.is_empty() {
        println!("No entries yet. Be the first to sign!");
        return;
    }
    for entry in &view.guestbook.entries {
        println!("[{}] {}: {}", entry.created_at, entry.name, entry.message);
    }
}
