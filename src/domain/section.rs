use serde::{Deserialize, Serialize};

use crate::domain::NewsArticle;

/// A titled group of articles, e.g. "Topics in the News" or "October 15, 2026".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSection {
    pub header: String,
    pub articles: Vec<NewsArticle>,
}

impl NewsSection {
    pub fn new(header: impl Into<String>, articles: Vec<NewsArticle>) -> Self {
        Self {
            header: header.into(),
            articles,
        }
    }
}

/// Group articles by section header.
///
/// Sections appear in the order their header is first seen and articles keep
/// their relative order inside a section.
pub fn group_into_sections(articles: Vec<NewsArticle>) -> Vec<NewsSection> {
    let mut sections: Vec<NewsSection> = Vec::new();

    for article in articles {
        match sections
            .iter_mut()
            .find(|s| s.header == article.section_header)
        {
            Some(section) => section.articles.push(article),
            None => {
                let header = article.section_header.clone();
                sections.push(NewsSection::new(header, vec![article]));
            }
        }
    }

    sections
}

pub fn article_count(sections: &[NewsSection]) -> usize {
    sections.iter().map(|s| s.articles.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(header: &str, title: &str) -> NewsArticle {
        NewsArticle::new(header, title.into(), title.into(), String::new())
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let sections = group_into_sections(vec![
            article("Ongoing", "a"),
            article("Recent Deaths", "b"),
            article("Ongoing", "c"),
        ]);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].header, "Ongoing");
        assert_eq!(sections[1].header, "Recent Deaths");
        let titles: Vec<_> = sections[0].articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_into_sections(Vec::new()).is_empty());
    }

    #[test]
    fn test_article_count() {
        let sections = group_into_sections(vec![
            article("Ongoing", "a"),
            article("Recent Deaths", "b"),
            article("Ongoing", "c"),
        ]);
        assert_eq!(article_count(&sections), 3);
    }
}
