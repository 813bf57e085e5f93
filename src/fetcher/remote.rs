use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::app::Result;
use crate::domain::{article_count, NewsSection};
use crate::fetcher::{FetchResult, Fetcher};
use crate::parser::WikipediaParser;

pub const DEFAULT_PAGE_URL: &str = "https://en.m.wikipedia.org/wiki/Portal:Current_events";

/// Outcome of fetching the current events page
#[derive(Debug)]
pub enum RemoteFetch {
    Sections {
        sections: Vec<NewsSection>,
        etag: Option<String>,
        last_modified: Option<String>,
    },
    NotModified,
}

/// Remote data source: fetches the portal page and parses it into sections.
pub struct RemoteSource {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    parser: WikipediaParser,
    page_url: String,
}

impl RemoteSource {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, parser: WikipediaParser) -> Self {
        Self::with_page_url(fetcher, parser, DEFAULT_PAGE_URL)
    }

    pub fn with_page_url(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        parser: WikipediaParser,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            page_url: page_url.into(),
        }
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Fetch and parse the current events page.
    ///
    /// Passing validators from a previous fetch allows the server to answer
    /// with [`RemoteFetch::NotModified`].
    pub async fn fetch_current_events(
        &self,
        etag: Option<&str>,
        last_modified: Option<&str>,
    ) -> Result<RemoteFetch> {
        debug!(url = %self.page_url, "Fetching current events");

        let result = self
            .fetcher
            .fetch(&self.page_url, etag, last_modified)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch current events"))?;

        match result {
            FetchResult::NotModified => {
                debug!("Current events page not modified");
                Ok(RemoteFetch::NotModified)
            }
            FetchResult::Content {
                body,
                etag,
                last_modified,
            } => {
                let html = String::from_utf8_lossy(&body);
                let sections = self.parser.parse(&html);

                debug!(
                    sections = sections.len(),
                    articles = article_count(&sections),
                    "Fetched current events"
                );

                Ok(RemoteFetch::Sections {
                    sections,
                    etag,
                    last_modified,
                })
            }
        }
    }

    /// Whether the page can currently be fetched
    pub async fn is_available(&self) -> bool {
        match self.fetcher.fetch(&self.page_url, None, None).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Remote source not available");
                false
            }
        }
    }
}
