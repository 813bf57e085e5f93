use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{BriefError, Result};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::{Fetcher, RemoteSource};
use crate::parser::WikipediaParser;
use crate::repository::NewsRepository;
use crate::store::SqliteStore;

/// Wires the store, fetcher, parser and repository together.
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub repository: Arc<NewsRepository>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, config: Config) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        Self::with_store(Arc::new(SqliteStore::new(&db_path)?), config)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        Self::with_store(Arc::new(SqliteStore::in_memory()?), config)
    }

    fn with_store(store: Arc<SqliteStore>, config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::with_timeout(config.source.timeout())?);
        let parser = WikipediaParser::with_base_url(&config.source.base_url)?;
        let remote = RemoteSource::with_page_url(fetcher, parser, config.source.page_url.clone());
        let repository = Arc::new(NewsRepository::new(store.clone(), remote));

        Ok(Self {
            store,
            repository,
            config: Arc::new(config),
        })
    }

    /// `<data_dir>/brief/brief.db`, creating the directory if needed
    pub fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| BriefError::Config("Could not find data directory".into()))?;
        let brief_dir = data_dir.join("brief");
        std::fs::create_dir_all(&brief_dir)?;
        Ok(brief_dir.join("brief.db"))
    }
}
