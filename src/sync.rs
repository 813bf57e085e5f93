//! Background sync.
//!
//! [`SyncWorker`] performs one refresh and reports whether it should be
//! retried; [`SyncDaemon`] runs it on the interval from the user's
//! preferences, backing off after failures. A PID file keeps a single daemon
//! per user:
//! - `brief daemon start` - run the sync loop in the foreground
//! - `brief daemon stop` - signal the running daemon
//! - `brief daemon status` - report whether a daemon is running

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::app::{BriefError, Result};
use crate::notify::Notifier;
use crate::preferences::{PreferenceStore, MIN_SYNC_INTERVAL_HOURS};
use crate::repository::{NewsRepository, RefreshOutcome};

/// First delay after a failed sync; doubles on each consecutive failure
pub const INITIAL_BACKOFF_SECS: u64 = 30;
pub const MIN_INTERVAL_SECS: u64 = MIN_SYNC_INTERVAL_HOURS as u64 * 3600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success { new_articles: usize },
    Retry { error: String },
}

/// One background refresh of the news cache.
pub struct SyncWorker {
    repository: Arc<NewsRepository>,
    notifier: Arc<dyn Notifier>,
    notifications_enabled: bool,
}

impl SyncWorker {
    pub fn new(repository: Arc<NewsRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
            notifications_enabled: false,
        }
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
    }

    pub fn repository(&self) -> &NewsRepository {
        &self.repository
    }

    pub async fn run_once(&self) -> SyncOutcome {
        debug!("Sync started");
        let previous = self.repository.cached_news_count();

        match self.repository.refresh_news().await {
            Ok(outcome) => {
                let new_articles = match outcome {
                    RefreshOutcome::NotModified => 0,
                    RefreshOutcome::Updated { .. } => self
                        .repository
                        .cached_news_count()
                        .saturating_sub(previous),
                };
                info!(new_articles, ?outcome, "Synced news");

                if self.notifications_enabled && new_articles > 0 {
                    self.notifier.news_update(new_articles);
                }
                SyncOutcome::Success { new_articles }
            }
            Err(e) => {
                warn!(error = %e, "Failed to sync news");
                let error = e.to_string();
                if self.notifications_enabled {
                    self.notifier.sync_error(&error);
                }
                SyncOutcome::Retry { error }
            }
        }
    }
}

/// Exponential retry delay, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            failures: 0,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let factor = 2u32.saturating_pow(self.failures);
        self.failures = self.failures.saturating_add(1);
        self.initial.saturating_mul(factor).min(self.max)
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Retry delays never drop below the initial delay
    pub fn set_max(&mut self, max: Duration) {
        self.max = max.max(self.initial);
    }
}

/// Parse interval string like "1h", "30m", "6h", "1d", or raw seconds
pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_lowercase();
    let (digits, unit, name) = match s.char_indices().last() {
        Some((i, 'd')) => (&s[..i], 86400, "days"),
        Some((i, 'h')) => (&s[..i], 3600, "hours"),
        Some((i, 'm')) => (&s[..i], 60, "minutes"),
        Some((i, 's')) => (&s[..i], 1, "seconds"),
        _ => {
            return s.parse::<u64>().map_err(|_| {
                format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s)
            })
        }
    };

    let n = digits
        .parse::<u64>()
        .map_err(|_| format!("Invalid {}: {}", name, digits))?;
    n.checked_mul(unit)
        .ok_or_else(|| format!("Interval too large: {}", s))
}

/// Parse a daemon sync interval, rejecting anything shorter than an hour
pub fn parse_sync_interval(s: &str) -> std::result::Result<u64, String> {
    let secs = parse_interval(s)?;
    if secs < MIN_INTERVAL_SECS {
        return Err(format!(
            "Sync interval {} is too short, the minimum is {}",
            s.trim(),
            format_interval(MIN_INTERVAL_SECS)
        ));
    }
    Ok(secs)
}

/// Format seconds using the largest unit that divides them evenly
pub fn format_interval(secs: u64) -> String {
    [(86400, "d"), (3600, "h"), (60, "m")]
        .iter()
        .find(|(unit, _)| secs >= *unit && secs % unit == 0)
        .map(|(unit, suffix)| format!("{}{}", secs / unit, suffix))
        .unwrap_or_else(|| format!("{}s", secs))
}

/// PID file guarding against concurrent daemons.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_RUNTIME_DIR/brief/daemon.pid`, or the cache dir when unset
    pub fn default_path() -> Option<PathBuf> {
        dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .map(|d| d.join("brief").join("daemon.pid"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_pid(&self) -> Option<u32> {
        fs::read_to_string(&self.path).ok()?.trim().parse().ok()
    }

    /// PID of a live daemon, ignoring stale files
    pub fn running_pid(&self) -> Option<u32> {
        self.read_pid().filter(|pid| process_exists(*pid))
    }

    fn write_current(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{}", std::process::id())
    }

    fn remove(&self) {
        let _ = fs::remove_file(&self.path);
    }

    pub fn status(&self) -> String {
        match self.read_pid() {
            Some(pid) if process_exists(pid) => format!("Daemon is running (PID: {})", pid),
            Some(_) => "Daemon is not running (stale PID file)".to_string(),
            None => "Daemon is not running".to_string(),
        }
    }

    /// Send SIGTERM to the daemon recorded in the file.
    pub fn stop(&self) -> Result<u32> {
        let pid = self
            .read_pid()
            .ok_or_else(|| BriefError::Other("No daemon is running (PID file not found)".into()))?;

        if !terminate(pid)? {
            return Err(BriefError::Other(format!(
                "Failed to stop daemon (PID {})",
                pid
            )));
        }
        self.remove();
        Ok(pid)
    }
}

#[cfg(unix)]
fn process_exists(pid: u32) -> bool {
    use std::process::Command;
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(windows)]
fn process_exists(pid: u32) -> bool {
    use std::process::Command;
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid)])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}

#[cfg(unix)]
fn terminate(pid: u32) -> Result<bool> {
    use std::process::Command;
    let status = Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()?;
    Ok(status.success())
}

#[cfg(windows)]
fn terminate(pid: u32) -> Result<bool> {
    use std::process::Command;
    let status = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status()?;
    Ok(status.success())
}

fn default_pid_file() -> Result<PidFile> {
    PidFile::default_path()
        .map(PidFile::new)
        .ok_or_else(|| BriefError::Other("Could not determine PID file path".into()))
}

/// Stop a running daemon by reading the default PID file
pub fn stop_daemon() -> Result<u32> {
    default_pid_file()?.stop()
}

pub fn daemon_status() -> String {
    match PidFile::default_path() {
        Some(path) => PidFile::new(path).status(),
        None => "Daemon is not running".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Overrides the interval from preferences, in seconds
    pub interval_override: Option<u64>,
    pub sync_on_start: bool,
    /// Log file path (None = stdout)
    pub log_file: Option<PathBuf>,
    pub pid_file: PidFile,
    /// Re-read before every cycle so `brief settings` applies without a restart
    pub preferences_file: PathBuf,
    /// Prune non-bookmarked articles older than this after each successful sync
    pub cache_ttl: Option<chrono::Duration>,
}

impl DaemonConfig {
    pub fn new(pid_file: PidFile, preferences_file: PathBuf) -> Self {
        Self {
            interval_override: None,
            sync_on_start: true,
            log_file: None,
            pid_file,
            preferences_file,
            cache_ttl: None,
        }
    }

    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(default_pid_file()?, PreferenceStore::default_path()?))
    }
}

/// Stops a running [`SyncDaemon`] from another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

pub struct SyncDaemon {
    worker: SyncWorker,
    config: DaemonConfig,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl SyncDaemon {
    pub fn new(worker: SyncWorker, config: DaemonConfig) -> Self {
        Self {
            worker,
            config,
            running: Arc::new(AtomicBool::new(true)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: self.running.clone(),
            wake: self.wake.clone(),
        }
    }

    fn log(&self, msg: &str) {
        let line = format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), msg);

        if let Some(ref log_path) = self.config.log_file {
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
            {
                let _ = writeln!(file, "{}", line);
            }
        } else {
            println!("{}", line);
        }
    }

    /// Run until SIGINT/SIGTERM.
    pub async fn run(&mut self) -> Result<()> {
        if let Some(pid) = self.config.pid_file.running_pid() {
            return Err(BriefError::Other(format!(
                "Another daemon instance is already running (PID {})",
                pid
            )));
        }

        self.config.pid_file.write_current().map_err(|e| {
            BriefError::Other(format!("Failed to write PID file: {}", e))
        })?;

        let handle = self.shutdown_handle();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = sigint.recv() => {},
                }
                handle.stop();
            });
        }

        #[cfg(windows)]
        {
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                handle.stop();
            });
        }

        let result = self.run_until_stopped().await;
        self.config.pid_file.remove();
        result
    }

    /// The sync loop, without PID file or signal handling.
    pub async fn run_until_stopped(&mut self) -> Result<()> {
        let mut first = true;
        let initial = Duration::from_secs(INITIAL_BACKOFF_SECS);
        let mut backoff = Backoff::new(initial, initial);

        self.log(&format!(
            "Brief daemon started (PID: {}, page: {})",
            std::process::id(),
            self.worker.repository().remote().page_url()
        ));

        while self.running.load(Ordering::SeqCst) {
            let prefs = match PreferenceStore::open(&self.config.preferences_file) {
                Ok(store) => store.get().clone(),
                Err(e) => {
                    self.log(&format!("Failed to read preferences, using defaults: {}", e));
                    Default::default()
                }
            };
            let interval = Duration::from_secs(
                self.config
                    .interval_override
                    .map(|secs| secs.max(MIN_INTERVAL_SECS))
                    .unwrap_or(u64::from(prefs.effective_sync_interval_hours()) * 3600),
            );
            backoff.set_max(interval);

            let skip_first = first && !self.config.sync_on_start;
            first = false;

            let delay = if skip_first {
                interval
            } else if !prefs.background_sync {
                self.log("Background sync is disabled in preferences");
                interval
            } else {
                self.worker.set_notifications_enabled(prefs.notifications);
                self.run_sync(&mut backoff).await.unwrap_or(interval)
            };

            self.log(&format!("Next sync in {}", format_interval(delay.as_secs())));
            self.sleep(delay).await;
        }

        self.log("Daemon shutting down...");
        Ok(())
    }

    /// Returns the retry delay after a failure, `None` after a success.
    async fn run_sync(&self, backoff: &mut Backoff) -> Option<Duration> {
        self.log("Running scheduled sync...");
        let start = Utc::now();

        match self.worker.run_once().await {
            SyncOutcome::Success { new_articles } => {
                backoff.reset();
                let elapsed = Utc::now().signed_duration_since(start);
                self.log(&format!(
                    "Sync complete: {} new articles ({:.1}s)",
                    new_articles,
                    elapsed.num_milliseconds() as f64 / 1000.0
                ));
                self.prune();
                None
            }
            SyncOutcome::Retry { error } => {
                let delay = backoff.next_delay();
                self.log(&format!("Sync failed: {}", error));
                Some(delay)
            }
        }
    }

    fn prune(&self) {
        let Some(ttl) = self.config.cache_ttl else { return };
        match self.worker.repository().prune_expired(ttl) {
            Ok(0) => {}
            Ok(deleted) => self.log(&format!("Pruned {} expired articles", deleted)),
            Err(e) => self.log(&format!("Failed to prune expired articles: {}", e)),
        }
    }

    async fn sleep(&self, delay: Duration) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            _ = self.wake.notified() => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::stub::{StubFetcher, StubResponse};
    use crate::fetcher::RemoteSource;
    use crate::notify::recording::{Notification, RecordingNotifier};
    use crate::parser::WikipediaParser;
    use crate::store::SqliteStore;

    const PAGE_TWO: &str = r#"
        <div aria-labelledby="Topics_in_the_news"><ul><li>Topic A</li><li>Topic B</li></ul></div>"#;

    const PAGE_THREE: &str = r#"
        <div aria-labelledby="Topics_in_the_news"><ul><li>Topic A</li><li>Topic B</li><li>Topic C</li></ul></div>"#;

    fn worker(
        responses: Vec<StubResponse>,
    ) -> (SyncWorker, Arc<RecordingNotifier>, Arc<StubFetcher>) {
        let fetcher = Arc::new(StubFetcher::new(responses));
        let remote = RemoteSource::new(fetcher.clone(), WikipediaParser::new().unwrap());
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let repository = Arc::new(NewsRepository::new(store, remote));
        let notifier = Arc::new(RecordingNotifier::default());
        (
            SyncWorker::new(repository, notifier.clone()),
            notifier,
            fetcher,
        )
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("30m").unwrap(), 1800);
        assert_eq!(parse_interval("1d").unwrap(), 86400);
        assert_eq!(parse_interval("45s").unwrap(), 45);
        assert_eq!(parse_interval(" 6H ").unwrap(), 21600);
        assert_eq!(parse_interval("3600").unwrap(), 3600);
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("h").is_err());
        assert!(parse_interval("").is_err());
        assert!(parse_interval("999999999999999999d").is_err());
        assert!(parse_interval("18446744073709551615m").is_err());
    }

    #[test]
    fn test_parse_sync_interval_minimum() {
        assert_eq!(parse_sync_interval("1h").unwrap(), 3600);
        assert_eq!(parse_sync_interval("2d").unwrap(), 172800);
        assert!(parse_sync_interval("0s").is_err());
        assert!(parse_sync_interval("59m").is_err());
        assert!(parse_sync_interval("soon").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(21600), "6h");
        assert_eq!(format_interval(1800), "30m");
        assert_eq!(format_interval(172800), "2d");
        assert_eq!(format_interval(90), "90s");
        assert_eq!(format_interval(0), "0s");
    }

    #[test]
    fn test_backoff_doubles_until_cap() {
        let mut backoff = Backoff::new(Duration::from_secs(30), Duration::from_secs(200));
        assert_eq!(backoff.next_delay(), Duration::from_secs(30));
        assert_eq!(backoff.next_delay(), Duration::from_secs(60));
        assert_eq!(backoff.next_delay(), Duration::from_secs(120));
        assert_eq!(backoff.next_delay(), Duration::from_secs(200));
        assert_eq!(backoff.next_delay(), Duration::from_secs(200));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_cap_not_below_initial_delay() {
        let mut backoff = Backoff::new(Duration::from_secs(30), Duration::from_secs(30));
        backoff.set_max(Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::from_secs(30));
        assert_eq!(backoff.next_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_survives_many_failures() {
        let mut backoff = Backoff::new(Duration::from_secs(30), Duration::from_secs(3600));
        for _ in 0..100 {
            backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_worker_counts_new_articles_and_notifies() {
        let (mut worker, notifier, _) = worker(vec![
            StubResponse::html(PAGE_TWO),
            StubResponse::html(PAGE_THREE),
        ]);
        worker.set_notifications_enabled(true);

        assert_eq!(
            worker.run_once().await,
            SyncOutcome::Success { new_articles: 2 }
        );
        assert_eq!(
            worker.run_once().await,
            SyncOutcome::Success { new_articles: 1 }
        );
        assert_eq!(
            notifier.sent(),
            vec![Notification::NewsUpdate(2), Notification::NewsUpdate(1)]
        );
    }

    #[tokio::test]
    async fn test_worker_silent_when_notifications_disabled() {
        let (worker, notifier, _) = worker(vec![StubResponse::html(PAGE_TWO)]);

        assert_eq!(
            worker.run_once().await,
            SyncOutcome::Success { new_articles: 2 }
        );
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_worker_no_notification_without_new_articles() {
        let (mut worker, notifier, _) = worker(vec![
            StubResponse::html_with_etag(PAGE_TWO, "\"v1\""),
            StubResponse::NotModified,
        ]);
        worker.set_notifications_enabled(true);

        worker.run_once().await;
        assert_eq!(
            worker.run_once().await,
            SyncOutcome::Success { new_articles: 0 }
        );
        assert_eq!(notifier.sent(), vec![Notification::NewsUpdate(2)]);
    }

    #[tokio::test]
    async fn test_worker_failure_requests_retry() {
        let (mut worker, notifier, _) = worker(vec![StubResponse::Fail("timed out".into())]);
        worker.set_notifications_enabled(true);

        let outcome = worker.run_once().await;
        assert!(matches!(outcome, SyncOutcome::Retry { ref error } if error.contains("timed out")));
        assert!(matches!(
            notifier.sent().as_slice(),
            [Notification::SyncError(msg)] if msg.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn test_worker_empty_page_requests_retry() {
        let (worker, notifier, _) = worker(vec![StubResponse::html("<p>nothing</p>")]);

        assert!(matches!(
            worker.run_once().await,
            SyncOutcome::Retry { .. }
        ));
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn test_pid_file_status() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::new(dir.path().join("daemon.pid"));
        assert_eq!(pid_file.status(), "Daemon is not running");
        assert!(pid_file.stop().is_err());

        pid_file.write_current().unwrap();
        assert_eq!(pid_file.read_pid(), Some(std::process::id()));
        assert_eq!(pid_file.running_pid(), Some(std::process::id()));

        pid_file.remove();
        assert_eq!(pid_file.read_pid(), None);
    }

    #[tokio::test]
    async fn test_daemon_syncs_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let (worker, _, fetcher) = worker(vec![StubResponse::html(PAGE_TWO)]);

        let mut config = DaemonConfig::new(
            PidFile::new(dir.path().join("daemon.pid")),
            dir.path().join("preferences.toml"),
        );
        config.log_file = Some(dir.path().join("daemon.log"));
        config.cache_ttl = Some(chrono::Duration::days(7));

        let mut daemon = SyncDaemon::new(worker, config);
        let handle = daemon.shutdown_handle();

        let task = tokio::spawn(async move { daemon.run_until_stopped().await });

        for _ in 0..200 {
            if fetcher.calls() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.stop();

        task.await.unwrap().unwrap();
        assert_eq!(fetcher.calls(), 1);

        let log = fs::read_to_string(dir.path().join("daemon.log")).unwrap();
        assert!(log.contains("Brief daemon started"));
        assert!(log.contains("Daemon shutting down"));
    }

    #[tokio::test]
    async fn test_daemon_zero_interval_override_does_not_spin() {
        let dir = tempfile::tempdir().unwrap();
        let (worker, _, fetcher) = worker(vec![StubResponse::html(PAGE_TWO)]);

        let mut config = DaemonConfig::new(
            PidFile::new(dir.path().join("daemon.pid")),
            dir.path().join("preferences.toml"),
        );
        config.interval_override = Some(0);
        config.log_file = Some(dir.path().join("daemon.log"));

        let mut daemon = SyncDaemon::new(worker, config);
        let handle = daemon.shutdown_handle();
        let task = tokio::spawn(async move { daemon.run_until_stopped().await });

        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.stop();
        task.await.unwrap().unwrap();

        assert_eq!(fetcher.calls(), 1);
        let log = fs::read_to_string(dir.path().join("daemon.log")).unwrap();
        assert!(log.contains("Next sync in 1h"));
    }

    #[tokio::test]
    async fn test_daemon_respects_disabled_background_sync() {
        let dir = tempfile::tempdir().unwrap();
        let prefs_path = dir.path().join("preferences.toml");
        PreferenceStore::open(&prefs_path)
            .unwrap()
            .set_background_sync(false)
            .unwrap();

        let (worker, _, fetcher) = worker(vec![StubResponse::html(PAGE_TWO)]);
        let mut config = DaemonConfig::new(PidFile::new(dir.path().join("daemon.pid")), prefs_path);
        config.log_file = Some(dir.path().join("daemon.log"));

        let mut daemon = SyncDaemon::new(worker, config);
        let handle = daemon.shutdown_handle();
        let task = tokio::spawn(async move { daemon.run_until_stopped().await });

        for _ in 0..200 {
            let log = fs::read_to_string(dir.path().join("daemon.log")).unwrap_or_default();
            if log.contains("disabled") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.stop();
        task.await.unwrap().unwrap();

        assert_eq!(fetcher.calls(), 0);
    }
}
