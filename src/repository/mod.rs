//! Offline-first news repository.
//!
//! Readers always see the local cache. A refresh fetches the portal page and
//! replaces the cache only when the fetch produced data; every mutation bumps
//! a version counter so [`Subscription`]s re-read the cache.

mod subscription;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::app::{BriefError, Result};
use crate::domain::{article_count, group_into_sections, NewsArticle, NewsSection};
use crate::fetcher::{RemoteFetch, RemoteSource};
use crate::store::{meta, Store};

pub use subscription::{Query, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache was replaced with freshly parsed sections
    Updated { sections: usize, articles: usize },
    /// The server reported the page unchanged since the last fetch
    NotModified,
}

pub struct NewsRepository {
    store: Arc<dyn Store + Send + Sync>,
    remote: RemoteSource,
    changes: watch::Sender<u64>,
}

impl NewsRepository {
    pub fn new(store: Arc<dyn Store + Send + Sync>, remote: RemoteSource) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            store,
            remote,
            changes,
        }
    }

    pub fn remote(&self) -> &RemoteSource {
        &self.remote
    }

    fn notify_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    fn subscribe(&self, query: Query) -> Subscription {
        Subscription::new(self.store.clone(), query, self.changes.subscribe())
    }

    /// Cached sections, emitted now and after every cache change
    pub fn observe_news(&self) -> Subscription {
        self.subscribe(Query::All)
    }

    pub fn observe_bookmarked_news(&self) -> Subscription {
        self.subscribe(Query::Bookmarked)
    }

    pub fn observe_search_results(&self, query: &str) -> Subscription {
        self.subscribe(Query::Search(query.to_string()))
    }

    pub fn cached_sections(&self) -> Result<Vec<NewsSection>> {
        Ok(group_into_sections(self.store.get_all_articles()?))
    }

    /// Refresh the cache from the remote page.
    ///
    /// An empty parse result is treated as a failure and leaves the cache as is.
    pub async fn refresh_news(&self) -> Result<RefreshOutcome> {
        debug!("Refreshing news from remote source");

        // An empty cache cannot be served on a 304
        let (etag, last_modified) = if self.store.count()? == 0 {
            (None, None)
        } else {
            (
                self.store.get_meta(meta::ETAG)?,
                self.store.get_meta(meta::LAST_MODIFIED)?,
            )
        };

        let fetched = self
            .remote
            .fetch_current_events(etag.as_deref(), last_modified.as_deref())
            .await
            .inspect_err(|e| error!(error = %e, "Failed to refresh news"))?;

        match fetched {
            RemoteFetch::NotModified => {
                self.mark_synced()?;
                Ok(RefreshOutcome::NotModified)
            }
            RemoteFetch::Sections {
                sections,
                etag,
                last_modified,
            } => {
                let outcome = self.store_fresh(&sections, etag, last_modified)?;
                info!(
                    sections = sections.len(),
                    articles = article_count(&sections),
                    "Refreshed news"
                );
                Ok(outcome)
            }
        }
    }

    /// Refresh without conditional validators.
    ///
    /// Falls back to the cached sections when the fetch fails and the cache is
    /// not empty. An empty parse result is returned as [`BriefError::NoData`].
    pub async fn force_refresh(&self) -> Result<Vec<NewsSection>> {
        debug!("Force refreshing news");

        let result = match self.remote.fetch_current_events(None, None).await {
            Ok(RemoteFetch::Sections {
                sections,
                etag,
                last_modified,
            }) => self
                .store_fresh(&sections, etag, last_modified)
                .and_then(|_| self.cached_sections()),
            Ok(RemoteFetch::NotModified) => self.cached_sections(),
            Err(e) => Err(e),
        };

        match result {
            Ok(sections) => Ok(sections),
            Err(BriefError::NoData) => Err(BriefError::NoData),
            Err(e) => {
                error!(error = %e, "Force refresh failed");
                let cached = self.cached_sections()?;
                if cached.is_empty() {
                    Err(e)
                } else {
                    debug!("Returning cached data as fallback");
                    Ok(cached)
                }
            }
        }
    }

    fn store_fresh(
        &self,
        sections: &[NewsSection],
        etag: Option<String>,
        last_modified: Option<String>,
    ) -> Result<RefreshOutcome> {
        if sections.is_empty() {
            warn!("Remote source returned empty data");
            return Err(BriefError::NoData);
        }

        let saved = self.store.replace_articles(sections)?;
        debug!(saved, "Saved articles to cache");

        if let Some(etag) = etag {
            self.store.set_meta(meta::ETAG, &etag)?;
        }
        if let Some(last_modified) = last_modified {
            self.store.set_meta(meta::LAST_MODIFIED, &last_modified)?;
        }
        self.mark_synced()?;
        self.notify_changed();

        Ok(RefreshOutcome::Updated {
            sections: sections.len(),
            articles: article_count(sections),
        })
    }

    fn mark_synced(&self) -> Result<()> {
        self.store
            .set_meta(meta::LAST_SYNCED_AT, &Utc::now().to_rfc3339())
    }

    pub fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .store
            .get_meta(meta::LAST_SYNCED_AT)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Number of cached articles; store failures count as an empty cache
    pub fn cached_news_count(&self) -> usize {
        self.store.count().unwrap_or_else(|e| {
            error!(error = %e, "Failed to get cached count");
            0
        })
    }

    pub fn clear_cache(&self) {
        debug!("Clearing cache");
        match self.store.clear_all() {
            Ok(()) => self.notify_changed(),
            Err(e) => error!(error = %e, "Failed to clear cache"),
        }
    }

    /// Delete non-bookmarked articles cached longer than `ttl` ago
    pub fn prune_expired(&self, ttl: Duration) -> Result<usize> {
        let deleted = self.store.delete_expired(Utc::now() - ttl)?;
        if deleted > 0 {
            debug!(deleted, "Deleted expired articles");
            self.notify_changed();
        }
        Ok(deleted)
    }

    pub fn toggle_bookmark(&self, article_id: &str, is_bookmarked: bool) -> Result<()> {
        if !self.store.set_bookmark(article_id, is_bookmarked)? {
            return Err(BriefError::ArticleNotFound(article_id.to_string()));
        }
        debug!(%article_id, is_bookmarked, "Updated bookmark");
        self.notify_changed();
        Ok(())
    }

    pub fn clear_bookmarks(&self) -> Result<usize> {
        let cleared = self.store.clear_bookmarks()?;
        if cleared > 0 {
            self.notify_changed();
        }
        Ok(cleared)
    }

    pub fn bookmarked_count(&self) -> Result<usize> {
        self.store.bookmarked_count()
    }

    pub fn bookmarked_sections(&self) -> Result<Vec<NewsSection>> {
        Ok(group_into_sections(self.store.get_bookmarked()?))
    }

    /// Sections whose articles match `query`; a blank query matches nothing
    pub fn search_articles(&self, query: &str) -> Result<Vec<NewsSection>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(group_into_sections(self.store.search(query)?))
    }

    /// Look up an article by full ID or unambiguous ID prefix
    pub fn find_article(&self, id_or_prefix: &str) -> Result<NewsArticle> {
        if let Some(article) = self.store.get_article(id_or_prefix)? {
            return Ok(article);
        }

        let mut matches: Vec<NewsArticle> = self
            .store
            .get_all_articles()?
            .into_iter()
            .filter(|a| a.id.starts_with(id_or_prefix))
            .collect();

        match matches.len() {
            0 => Err(BriefError::ArticleNotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(BriefError::Other(format!(
                "Article id prefix '{}' is ambiguous ({} matches)",
                id_or_prefix, n
            ))),
        }
    }
}
