//! # Brief
//!
//! A terminal-first, offline-first reader for Wikipedia's
//! [Current events portal](https://en.m.wikipedia.org/wiki/Portal:Current_events).
//!
//! ## Architecture
//!
//! ```text
//! HttpFetcher → WikipediaParser → NewsRepository → SqliteStore
//!                                       ↓
//!                        CLI / TUI / SyncDaemon
//! ```
//!
//! Readers always see the SQLite cache; a refresh replaces it only when the
//! page was fetched and parsed into at least one article.
//!
//! ## Quick Start
//!
//! ```bash
//! # Fetch the portal page
//! brief refresh
//!
//! # List cached articles, or search them
//! brief list
//! brief search earthquake
//!
//! # Launch the TUI
//! brief tui
//!
//! # Keep the cache fresh in the background
//! brief daemon start
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together the store, fetcher,
/// parser and repository.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/brief/config.toml`:
/// source page, cache TTL, colours and keybindings.
pub mod config;

/// Core domain models.
///
/// - [`NewsArticle`](domain::NewsArticle): one item from the page, with a SHA-256 ID
/// - [`NewsSection`](domain::NewsSection): a titled group of articles
pub mod domain;

/// HTTP fetching with conditional request support.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for page fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`RemoteSource`](fetcher::RemoteSource): fetch plus parse of the portal page
pub mod fetcher;

/// Notifications raised by background sync.
pub mod notify;

/// Parses the Current events portal HTML into sections.
pub mod parser;

/// User preferences persisted as TOML.
pub mod preferences;

/// Offline-first repository over the cache, with live subscriptions.
pub mod repository;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Background sync worker and daemon.
pub mod sync;

/// Terminal user interface.
///
/// Tabs for News, Bookmarks and Search over a list pane, a preview pane and
/// a status bar. Keybindings: j/k navigate, Tab switches tabs, b bookmarks,
/// / searches, o opens in browser, R refreshes, q quits.
pub mod tui;

/// Screen states derived from cache emissions.
pub mod view;
