//! User-facing notifications raised by background sync.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tracing::{info, warn};

pub const NEWS_UPDATE_TITLE: &str = "New Articles Available";
pub const SYNC_COMPLETE_TITLE: &str = "Brief";
pub const SYNC_ERROR_TITLE: &str = "Sync Failed";

pub fn news_update_text(count: usize) -> String {
    format!("{} new article(s) from Wikipedia Current Events", count)
}

pub trait Notifier: Send + Sync {
    fn news_update(&self, count: usize);
    fn sync_complete(&self);
    fn sync_error(&self, message: &str);
}

/// Emits notifications as log events, optionally appending them to a file
/// that a desktop notifier or `tail -f` can follow.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    file: Option<PathBuf>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
        }
    }

    fn append(&self, title: &str, body: &str) {
        let Some(path) = &self.file else { return };
        let line = format!("[{}] {}: {}", Local::now().format("%Y-%m-%d %H:%M:%S"), title, body);
        let result = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to write notification");
        }
    }
}

impl Notifier for LogNotifier {
    fn news_update(&self, count: usize) {
        let body = news_update_text(count);
        info!(count, "{}: {}", NEWS_UPDATE_TITLE, body);
        self.append(NEWS_UPDATE_TITLE, &body);
    }

    fn sync_complete(&self) {
        info!("News synced successfully");
        self.append(SYNC_COMPLETE_TITLE, "News synced successfully");
    }

    fn sync_error(&self, message: &str) {
        warn!(error = %message, "{}", SYNC_ERROR_TITLE);
        self.append(SYNC_ERROR_TITLE, message);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::Notifier;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Notification {
        NewsUpdate(usize),
        SyncComplete,
        SyncError(String),
    }

    /// Collects notifications for assertions
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn news_update(&self, count: usize) {
            self.sent.lock().unwrap().push(Notification::NewsUpdate(count));
        }

        fn sync_complete(&self) {
            self.sent.lock().unwrap().push(Notification::SyncComplete);
        }

        fn sync_error(&self, message: &str) {
            self.sent
                .lock()
                .unwrap()
                .push(Notification::SyncError(message.to_string()));
        }
    }
}
