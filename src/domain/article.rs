use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub section_header: String,
    pub title: String,
    pub html_content: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub is_bookmarked: bool,
}

impl NewsArticle {
    pub fn new(section_header: &str, title: String, html_content: String, url: String) -> Self {
        Self {
            id: Self::generate_id(section_header, &title),
            section_header: section_header.to_string(),
            title,
            html_content,
            url,
            timestamp: Utc::now(),
            is_bookmarked: false,
        }
    }

    /// Generate a deterministic ID from the section header and article text
    pub fn generate_id(section_header: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(section_header.as_bytes());
        hasher.update(b"-");
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Short form of the ID for display and CLI arguments
    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}
