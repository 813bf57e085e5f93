pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{NewsArticle, NewsSection};

pub use sqlite::SqliteStore;

/// Keys used in the `sync_meta` table
pub mod meta {
    pub const ETAG: &str = "etag";
    pub const LAST_MODIFIED: &str = "last_modified";
    pub const LAST_SYNCED_AT: &str = "last_synced_at";
}

pub trait Store {
    // Article cache
    fn save_articles(&self, sections: &[NewsSection]) -> Result<usize>;
    fn replace_articles(&self, sections: &[NewsSection]) -> Result<usize>;
    fn get_article(&self, id: &str) -> Result<Option<NewsArticle>>;
    fn get_all_articles(&self) -> Result<Vec<NewsArticle>>;
    fn count(&self) -> Result<usize>;
    fn clear_all(&self) -> Result<()>;
    fn delete_expired(&self, cached_before: DateTime<Utc>) -> Result<usize>;
    fn search(&self, query: &str) -> Result<Vec<NewsArticle>>;

    // Bookmarks
    fn get_bookmarked(&self) -> Result<Vec<NewsArticle>>;
    fn set_bookmark(&self, id: &str, is_bookmarked: bool) -> Result<bool>;
    fn clear_bookmarks(&self) -> Result<usize>;
    fn bookmarked_count(&self) -> Result<usize>;

    // Sync metadata
    fn get_meta(&self, key: &str) -> Result<Option<String>>;
    fn set_meta(&self, key: &str, value: &str) -> Result<()>;
}
