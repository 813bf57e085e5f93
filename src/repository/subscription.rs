use std::sync::Arc;

use tokio::sync::watch;

use crate::app::Result;
use crate::domain::{group_into_sections, NewsSection};
use crate::store::Store;

/// Which slice of the cache a subscription follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All,
    Bookmarked,
    Search(String),
}

/// A live view of the cache.
///
/// The first call to [`Subscription::next`] yields the current state; later
/// calls wait for the repository to change the cache. Returns `None` once the
/// repository has been dropped.
pub struct Subscription {
    store: Arc<dyn Store + Send + Sync>,
    query: Query,
    changes: watch::Receiver<u64>,
    primed: bool,
}

impl Subscription {
    pub(crate) fn new(
        store: Arc<dyn Store + Send + Sync>,
        query: Query,
        changes: watch::Receiver<u64>,
    ) -> Self {
        Self {
            store,
            query,
            changes,
            primed: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<Vec<NewsSection>>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        }
        self.primed = true;
        self.changes.mark_unchanged();
        Some(self.load())
    }

    /// Whether the cache changed since the last emission
    pub fn has_changed(&self) -> bool {
        !self.primed || self.changes.has_changed().unwrap_or(false)
    }

    /// Read the current state and mark it as seen, without waiting
    pub fn current(&mut self) -> Result<Vec<NewsSection>> {
        self.primed = true;
        self.changes.mark_unchanged();
        self.load()
    }

    fn load(&self) -> Result<Vec<NewsSection>> {
        let articles = match &self.query {
            Query::All => self.store.get_all_articles()?,
            Query::Bookmarked => self.store.get_bookmarked()?,
            Query::Search(q) if q.trim().is_empty() => Vec::new(),
            Query::Search(q) => self.store.search(q.trim())?,
        };
        Ok(group_into_sections(articles))
    }
}
