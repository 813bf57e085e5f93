use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Page parsing error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error("No data available")]
    NoData,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preferences error: {0}")]
    Preferences(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BriefError>;
