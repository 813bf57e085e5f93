//! Scripted [`Fetcher`] used by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{BriefError, Result};
use crate::fetcher::{FetchResult, Fetcher};

#[derive(Debug, Clone)]
pub enum StubResponse {
    Html {
        body: String,
        etag: Option<String>,
    },
    NotModified,
    Fail(String),
}

impl StubResponse {
    pub fn html(body: &str) -> Self {
        StubResponse::Html {
            body: body.to_string(),
            etag: None,
        }
    }

    pub fn html_with_etag(body: &str, etag: &str) -> Self {
        StubResponse::Html {
            body: body.to_string(),
            etag: Some(etag.to_string()),
        }
    }
}

/// Replays responses in order; the last one repeats once the queue drains.
pub struct StubFetcher {
    responses: Mutex<VecDeque<StubResponse>>,
    last: Mutex<Option<StubResponse>>,
    urls: Mutex<Vec<String>>,
    last_etag: Mutex<Option<String>>,
}

impl StubFetcher {
    pub fn new(responses: Vec<StubResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            urls: Mutex::new(Vec::new()),
            last_etag: Mutex::new(None),
        }
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn last_etag(&self) -> Option<String> {
        self.last_etag.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(
        &self,
        url: &str,
        etag: Option<&str>,
        _last_modified: Option<&str>,
    ) -> Result<FetchResult> {
        self.urls.lock().unwrap().push(url.to_string());
        *self.last_etag.lock().unwrap() = etag.map(String::from);

        let next = self.responses.lock().unwrap().pop_front();
        let response = match next {
            Some(r) => {
                *self.last.lock().unwrap() = Some(r.clone());
                r
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| StubResponse::Fail("no scripted response".into())),
        };

        match response {
            StubResponse::Html { body, etag } => Ok(FetchResult::Content {
                body: body.into_bytes(),
                etag,
                last_modified: None,
            }),
            StubResponse::NotModified => Ok(FetchResult::NotModified),
            StubResponse::Fail(msg) => Err(BriefError::Other(msg)),
        }
    }
}
