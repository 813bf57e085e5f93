use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{BriefError, Result};
use crate::domain::{NewsArticle, NewsSection};
use crate::store::{meta, Store};

const ARTICLE_COLUMNS: &str =
    "id, section_header, title, html_content, url, timestamp, is_bookmarked";

const UPSERT_ARTICLE: &str =
    "INSERT OR REPLACE INTO news_articles
        (id, section_header, title, html_content, url, timestamp, cached_at, is_bookmarked)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
        COALESCE((SELECT is_bookmarked FROM news_articles WHERE id = ?1), 0))";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| BriefError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            BriefError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_article(row: &Row<'_>) -> rusqlite::Result<NewsArticle> {
        Ok(NewsArticle {
            id: row.get(0)?,
            section_header: row.get(1)?,
            title: row.get(2)?,
            html_content: row.get(3)?,
            url: row.get(4)?,
            timestamp: row
                .get::<_, String>(5)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            is_bookmarked: row.get::<_, i32>(6)? != 0,
        })
    }

    fn query_articles(
        conn: &Connection,
        where_clause: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<NewsArticle>> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM news_articles {where_clause}
             ORDER BY timestamp DESC, seq ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let articles = stmt
            .query_map(args, Self::row_to_article)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    fn insert_sections(tx: &rusqlite::Transaction<'_>, sections: &[NewsSection]) -> Result<usize> {
        let cached_at = Self::format_datetime(&Utc::now());
        let mut stmt = tx.prepare(UPSERT_ARTICLE)?;
        let mut count = 0;

        for section in sections {
            for article in &section.articles {
                count += stmt.execute(params![
                    article.id,
                    section.header,
                    article.title,
                    article.html_content,
                    article.url,
                    Self::format_datetime(&article.timestamp),
                    cached_at,
                ])?;
            }
        }

        Ok(count)
    }

    /// Escape `%`, `_` and the escape character itself for a LIKE pattern
    fn escape_like(query: &str) -> String {
        let mut escaped = String::with_capacity(query.len());
        for c in query.chars() {
            if matches!(c, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }
}

impl Store for SqliteStore {
    fn save_articles(&self, sections: &[NewsSection]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let count = Self::insert_sections(&tx, sections)?;
        tx.commit()?;
        Ok(count)
    }

    fn replace_articles(&self, sections: &[NewsSection]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM news_articles WHERE is_bookmarked = 0", [])?;
        let count = Self::insert_sections(&tx, sections)?;
        tx.commit()?;
        Ok(count)
    }

    fn get_article(&self, id: &str) -> Result<Option<NewsArticle>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {ARTICLE_COLUMNS} FROM news_articles WHERE id = ?1"),
                params![id],
                Self::row_to_article,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_articles(&self) -> Result<Vec<NewsArticle>> {
        let conn = self.conn()?;
        Self::query_articles(&conn, "", &[])
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM news_articles", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn clear_all(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM news_articles", [])?;
        // Without cached rows the validators would turn the next fetch into a 304
        tx.execute(
            "DELETE FROM sync_meta WHERE key IN (?1, ?2)",
            params![meta::ETAG, meta::LAST_MODIFIED],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_expired(&self, cached_before: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM news_articles WHERE cached_at < ?1 AND is_bookmarked = 0",
            params![Self::format_datetime(&cached_before)],
        )?;
        Ok(deleted)
    }

    fn search(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let conn = self.conn()?;
        let pattern = Self::escape_like(query);
        Self::query_articles(
            &conn,
            "WHERE title LIKE '%' || ?1 || '%' ESCAPE '\\'
                OR html_content LIKE '%' || ?1 || '%' ESCAPE '\\'
                OR section_header LIKE '%' || ?1 || '%' ESCAPE '\\'",
            &[&pattern],
        )
    }

    fn get_bookmarked(&self) -> Result<Vec<NewsArticle>> {
        let conn = self.conn()?;
        Self::query_articles(&conn, "WHERE is_bookmarked = 1", &[])
    }

    fn set_bookmark(&self, id: &str, is_bookmarked: bool) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE news_articles SET is_bookmarked = ?1 WHERE id = ?2",
            params![is_bookmarked as i32, id],
        )?;
        Ok(updated > 0)
    }

    fn clear_bookmarks(&self) -> Result<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE news_articles SET is_bookmarked = 0 WHERE is_bookmarked = 1",
            [],
        )?;
        Ok(updated)
    }

    fn bookmarked_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM news_articles WHERE is_bookmarked = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM sync_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sync_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn article(header: &str, title: &str) -> NewsArticle {
        NewsArticle::new(header, title.into(), format!("<b>{}</b>", title), String::new())
    }

    fn sections() -> Vec<NewsSection> {
        vec![
            NewsSection::new("Ongoing", vec![article("Ongoing", "War"), article("Ongoing", "Strike")]),
            NewsSection::new("Recent Deaths", vec![article("Recent Deaths", "Jane Doe")]),
        ]
    }

    #[test]
    fn test_save_and_get_article() {
        let store = SqliteStore::in_memory().unwrap();
        let sections = sections();
        assert_eq!(store.save_articles(&sections).unwrap(), 3);

        let id = &sections[0].articles[0].id;
        let retrieved = store.get_article(id).unwrap().unwrap();
        assert_eq!(retrieved.title, "War");
        assert_eq!(retrieved.section_header, "Ongoing");
        assert!(!retrieved.is_bookmarked);
    }

    #[test]
    fn test_get_all_keeps_page_order_for_same_timestamp() {
        let store = SqliteStore::in_memory().unwrap();
        let ts = Utc::now();
        let mut sections = sections();
        for a in sections.iter_mut().flat_map(|s| s.articles.iter_mut()) {
            a.timestamp = ts;
        }
        store.save_articles(&sections).unwrap();

        let titles: Vec<_> = store
            .get_all_articles()
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["War", "Strike", "Jane Doe"]);
    }

    #[test]
    fn test_get_all_orders_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        let mut old = article("Ongoing", "Old");
        old.timestamp = Utc::now() - Duration::days(1);
        let new = article("Ongoing", "New");
        store
            .save_articles(&[NewsSection::new("Ongoing", vec![old, new])])
            .unwrap();

        let all = store.get_all_articles().unwrap();
        assert_eq!(all[0].title, "New");
        assert_eq!(all[1].title, "Old");
    }

    #[test]
    fn test_save_same_id_replaces_row() {
        let store = SqliteStore::in_memory().unwrap();
        let mut a = article("Ongoing", "War");
        store
            .save_articles(&[NewsSection::new("Ongoing", vec![a.clone()])])
            .unwrap();

        a.html_content = "<i>updated</i>".into();
        store
            .save_articles(&[NewsSection::new("Ongoing", vec![a.clone()])])
            .unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(
            store.get_article(&a.id).unwrap().unwrap().html_content,
            "<i>updated</i>"
        );
    }

    #[test]
    fn test_save_keeps_bookmark_flag() {
        let store = SqliteStore::in_memory().unwrap();
        let sections = sections();
        store.save_articles(&sections).unwrap();
        let id = sections[0].articles[0].id.clone();

        assert!(store.set_bookmark(&id, true).unwrap());
        store.save_articles(&sections).unwrap();

        assert!(store.get_article(&id).unwrap().unwrap().is_bookmarked);
    }

    #[test]
    fn test_replace_articles_keeps_bookmarked_rows() {
        let store = SqliteStore::in_memory().unwrap();
        let first = sections();
        store.save_articles(&first).unwrap();
        let kept = first[1].articles[0].id.clone();
        store.set_bookmark(&kept, true).unwrap();

        let fresh = vec![NewsSection::new("Ongoing", vec![article("Ongoing", "Election")])];
        store.replace_articles(&fresh).unwrap();

        let titles: Vec<_> = store
            .get_all_articles()
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Election".to_string()));
        assert!(titles.contains(&"Jane Doe".to_string()));
    }

    #[test]
    fn test_clear_all_removes_articles_and_validators() {
        let store = SqliteStore::in_memory().unwrap();
        store.save_articles(&sections()).unwrap();
        store.set_meta(meta::ETAG, "\"abc\"").unwrap();
        store.set_meta(meta::LAST_SYNCED_AT, "2026-01-01T00:00:00.000Z").unwrap();

        store.clear_all().unwrap();

        assert_eq!(store.count().unwrap(), 0);
        assert!(store.get_meta(meta::ETAG).unwrap().is_none());
        assert!(store.get_meta(meta::LAST_SYNCED_AT).unwrap().is_some());
    }

    #[test]
    fn test_delete_expired() {
        let store = SqliteStore::in_memory().unwrap();
        let sections = sections();
        store.save_articles(&sections).unwrap();
        store.set_bookmark(&sections[0].articles[0].id, true).unwrap();

        assert_eq!(store.delete_expired(Utc::now() - Duration::hours(1)).unwrap(), 0);
        assert_eq!(store.delete_expired(Utc::now() + Duration::hours(1)).unwrap(), 2);

        // Bookmarked articles never expire
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_search_matches_title_content_and_header() {
        let store = SqliteStore::in_memory().unwrap();
        store.save_articles(&sections()).unwrap();

        assert_eq!(store.search("war").unwrap().len(), 1);
        assert_eq!(store.search("<b>Strike").unwrap().len(), 1);
        assert_eq!(store.search("deaths").unwrap().len(), 1);
        assert_eq!(store.search("ONGOING").unwrap().len(), 2);
        assert!(store.search("volcano").unwrap().is_empty());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let store = SqliteStore::in_memory().unwrap();
        store.save_articles(&sections()).unwrap();
        store
            .save_articles(&[NewsSection::new(
                "Ongoing",
                vec![article("Ongoing", "Inflation hits 5%")],
            )])
            .unwrap();

        assert!(store.search("_").unwrap().is_empty());
        assert_eq!(store.search("5%").unwrap().len(), 1);
        assert!(store.search("%x").unwrap().is_empty());
    }

    #[test]
    fn test_bookmarks() {
        let store = SqliteStore::in_memory().unwrap();
        let sections = sections();
        store.save_articles(&sections).unwrap();

        assert_eq!(store.bookmarked_count().unwrap(), 0);
        store.set_bookmark(&sections[0].articles[0].id, true).unwrap();
        store.set_bookmark(&sections[1].articles[0].id, true).unwrap();
        assert_eq!(store.bookmarked_count().unwrap(), 2);
        assert_eq!(store.get_bookmarked().unwrap().len(), 2);

        store.set_bookmark(&sections[0].articles[0].id, false).unwrap();
        assert_eq!(store.bookmarked_count().unwrap(), 1);

        assert_eq!(store.clear_bookmarks().unwrap(), 1);
        assert!(store.get_bookmarked().unwrap().is_empty());
    }

    #[test]
    fn test_set_bookmark_unknown_id() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(!store.set_bookmark("nonexistent-id", true).unwrap());
    }

    #[test]
    fn test_meta_roundtrip_and_overwrite() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_meta(meta::ETAG).unwrap().is_none());

        store.set_meta(meta::ETAG, "\"v1\"").unwrap();
        store.set_meta(meta::ETAG, "\"v2\"").unwrap();
        assert_eq!(store.get_meta(meta::ETAG).unwrap().as_deref(), Some("\"v2\""));
    }

    #[test]
    fn test_get_article_nonexistent() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_article("nonexistent-id").unwrap().is_none());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(SqliteStore::escape_like("a%b_c\\"), "a\\%b\\_c\\\\");
    }

    #[test]
    fn test_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.db");
        {
            let store = SqliteStore::new(&path).unwrap();
            store.save_articles(&sections()).unwrap();
        }
        let reopened = SqliteStore::new(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 3);
    }
}
