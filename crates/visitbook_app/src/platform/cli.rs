use clap::{Parser, Subcommand};

use super::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "visitbook",
    version,
    about = "Headless view-counter and guestbook client for a static blog"
)]
pub struct Cli {
    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the view count for a page and record this visit.
    View {
        /// Page slug, the unique key of the view record.
        slug: String,
        /// Display title used if the record is created lazily.
        #[arg(long)]
        title: Option<String>,
    },
    /// Guestbook board operations.
    #[command(subcommand)]
    Guestbook(GuestbookCommand),
}

#[derive(Debug, Subcommand)]
pub enum GuestbookCommand {
    /// Print all entries, newest first.
    List,
    /// Leave an entry on the board.
    Sign { name: String, message: String },
    /// Follow the board and print it again whenever someone signs.
    Watch {
        /// How long to watch before exiting, in seconds.
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },
}
