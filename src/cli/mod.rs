pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "brief")]
#[command(about = "Wikipedia's Current Events portal in your terminal", long_about = None)]
pub struct Cli {
    /// SQLite cache path (default: <data dir>/brief/brief.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file path (default: ~/.config/brief/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the current events page and update the cache
    Refresh {
        /// Ignore cached validators and always download the page
        #[arg(short, long)]
        force: bool,
    },
    /// List cached articles grouped by section
    List {
        /// Only bookmarked articles
        #[arg(short, long)]
        bookmarks: bool,

        #[arg(long)]
        json: bool,
    },
    /// Search cached articles
    Search {
        query: String,

        #[arg(long)]
        json: bool,
    },
    /// Bookmark an article by ID or ID prefix
    Bookmark { id: String },
    /// Remove a bookmark by ID or ID prefix
    Unbookmark { id: String },
    /// Remove every bookmark
    ClearBookmarks,
    /// Show cache and daemon status
    Status,
    /// Delete every cached article, bookmarks included
    ClearCache,
    /// Delete non-bookmarked articles cached longer ago than the given age
    Prune {
        /// Age such as "7d" or "12h" (default: the cache TTL from config)
        #[arg(long)]
        older_than: Option<String>,
    },
    /// Launch the TUI
    Tui,
    /// Background sync daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
pub enum DaemonAction {
    /// Run the sync loop until stopped
    Start {
        /// Override the preferred interval (e.g., "30m", "6h", "1d")
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip the sync on start
        #[arg(long)]
        no_initial_sync: bool,

        /// Log file path (default: stdout)
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Append notifications to this file
        #[arg(long)]
        notify_log: Option<PathBuf>,
    },
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    Show,
    Theme {
        #[arg(value_enum)]
        theme: Theme,
    },
    /// Enable or disable background sync
    Sync {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Hours between background syncs (1, 3, 6, 12 or 24)
    Interval { hours: u32 },
    Notifications {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Restore default preferences
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}
