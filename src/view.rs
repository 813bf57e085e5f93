//! Screen state derived from cache emissions and refresh results.

use crate::app::Result;
use crate::domain::NewsSection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsUiState {
    Loading,
    Success(Vec<NewsSection>),
    Empty,
    Error { message: String, can_retry: bool },
}

impl NewsUiState {
    /// Apply a cache emission.
    ///
    /// An empty cache does not replace `Loading`: the refresh in flight will
    /// either fill the cache or report an error.
    pub fn on_emission(&mut self, emission: Result<Vec<NewsSection>>) {
        match emission {
            Ok(sections) if !sections.is_empty() => *self = NewsUiState::Success(sections),
            Ok(_) => {
                if !matches!(self, NewsUiState::Loading) {
                    *self = NewsUiState::Empty;
                }
            }
            Err(e) => {
                *self = NewsUiState::Error {
                    message: e.to_string(),
                    can_retry: true,
                }
            }
        }
    }

    pub fn on_refresh_started(&mut self) {
        *self = NewsUiState::Loading;
    }

    /// A failed refresh only surfaces when there is nothing cached to show
    pub fn on_refresh_failed(&mut self, message: impl Into<String>, cached: Vec<NewsSection>) {
        if cached.is_empty() {
            *self = NewsUiState::Error {
                message: message.into(),
                can_retry: true,
            };
        } else {
            *self = NewsUiState::Success(cached);
        }
    }

    pub fn sections(&self) -> &[NewsSection] {
        match self {
            NewsUiState::Success(sections) => sections,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarksUiState {
    Loading,
    Success(Vec<NewsSection>),
    Empty,
    Error { message: String },
}

impl BookmarksUiState {
    pub fn on_emission(&mut self, emission: Result<Vec<NewsSection>>) {
        *self = match emission {
            Ok(sections) if !sections.is_empty() => BookmarksUiState::Success(sections),
            Ok(_) => BookmarksUiState::Empty,
            Err(e) => BookmarksUiState::Error {
                message: e.to_string(),
            },
        };
    }

    pub fn sections(&self) -> &[NewsSection] {
        match self {
            BookmarksUiState::Success(sections) => sections,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUiState {
    /// No query entered yet
    Idle,
    Results(Vec<NewsSection>),
    NoResults,
    Error { message: String },
}

impl SearchUiState {
    pub fn on_emission(&mut self, query: &str, emission: Result<Vec<NewsSection>>) {
        *self = match emission {
            _ if query.trim().is_empty() => SearchUiState::Idle,
            Ok(sections) if !sections.is_empty() => SearchUiState::Results(sections),
            Ok(_) => SearchUiState::NoResults,
            Err(e) => SearchUiState::Error {
                message: e.to_string(),
            },
        };
    }

    pub fn sections(&self) -> &[NewsSection] {
        match self {
            SearchUiState::Results(sections) => sections,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BriefError;
    use crate::domain::NewsArticle;

    fn sections() -> Vec<NewsSection> {
        vec![NewsSection::new(
            "Ongoing",
            vec![NewsArticle::new("Ongoing", "War".into(), "War".into(), String::new())],
        )]
    }

    #[test]
    fn test_news_emission_success() {
        let mut state = NewsUiState::Loading;
        state.on_emission(Ok(sections()));
        assert_eq!(state, NewsUiState::Success(sections()));
    }

    #[test]
    fn test_news_empty_emission_while_loading_keeps_loading() {
        let mut state = NewsUiState::Loading;
        state.on_emission(Ok(Vec::new()));
        assert_eq!(state, NewsUiState::Loading);
    }

    #[test]
    fn test_news_empty_emission_after_success() {
        let mut state = NewsUiState::Success(sections());
        state.on_emission(Ok(Vec::new()));
        assert_eq!(state, NewsUiState::Empty);
    }

    #[test]
    fn test_news_emission_error() {
        let mut state = NewsUiState::Loading;
        state.on_emission(Err(BriefError::Other("disk full".into())));
        assert_eq!(
            state,
            NewsUiState::Error {
                message: "disk full".into(),
                can_retry: true
            }
        );
    }

    #[test]
    fn test_refresh_failure_with_cache_shows_cache() {
        let mut state = NewsUiState::Loading;
        state.on_refresh_failed("offline", sections());
        assert_eq!(state, NewsUiState::Success(sections()));
    }

    #[test]
    fn test_refresh_failure_without_cache_is_retryable_error() {
        let mut state = NewsUiState::Loading;
        state.on_refresh_failed("offline", Vec::new());
        assert_eq!(
            state,
            NewsUiState::Error {
                message: "offline".into(),
                can_retry: true
            }
        );
    }

    #[test]
    fn test_bookmarks_states() {
        let mut state = BookmarksUiState::Loading;
        state.on_emission(Ok(Vec::new()));
        assert_eq!(state, BookmarksUiState::Empty);

        state.on_emission(Ok(sections()));
        assert_eq!(state.sections().len(), 1);
    }

    #[test]
    fn test_search_states() {
        let mut state = SearchUiState::Idle;
        state.on_emission("", Ok(Vec::new()));
        assert_eq!(state, SearchUiState::Idle);

        state.on_emission("volcano", Ok(Vec::new()));
        assert_eq!(state, SearchUiState::NoResults);

        state.on_emission("war", Ok(sections()));
        assert_eq!(state.sections().len(), 1);
    }
}
