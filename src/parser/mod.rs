//! Parser for the Wikipedia *Portal:Current_events* page.
//!
//! The page is made of a few fixed boxes (topics in the news, ongoing events,
//! recent deaths) identified by their `aria-labelledby` attribute, followed by
//! one block per day with a `current-events-heading` and a
//! `current-events-content` list.

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::app::{BriefError, Result};
use crate::domain::{article_count, NewsArticle, NewsSection};

pub const DEFAULT_BASE_URL: &str = "https://en.m.wikipedia.org/";

/// Fixed boxes in page order: (aria label, display header)
const FIXED_SECTIONS: [(&str, &str); 3] = [
    ("Topics_in_the_news", "Topics in the News"),
    ("Ongoing_events", "Ongoing"),
    ("Recent_deaths", "Recent Deaths"),
];

struct Selectors {
    list: Selector,
    list_item: Selector,
    day_heading: Selector,
    day_title: Selector,
    day_list: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            list: parse_selector("ul")?,
            list_item: parse_selector("li")?,
            day_heading: parse_selector("div.current-events-heading")?,
            day_title: parse_selector("span.summary")?,
            day_list: parse_selector("div.current-events-content > ul")?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| BriefError::Parse(format!("bad selector {s:?}: {e:?}")))
}

fn parse_regex(s: &str) -> Result<Regex> {
    Regex::new(s).map_err(|e| BriefError::Parse(format!("bad pattern {s:?}: {e}")))
}

pub struct WikipediaParser {
    base_url: Url,
    selectors: Selectors,
    relative_href: Regex,
    first_href: Regex,
    weekday_suffix: Regex,
}

impl WikipediaParser {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Build a parser that resolves relative links against `base_url`
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            selectors: Selectors::new()?,
            relative_href: parse_regex(r#"\bhref="(/[^"]*)""#)?,
            first_href: parse_regex(r#"href="([^"]+)""#)?,
            weekday_suffix: parse_regex(r" \(.*?\)")?,
        })
    }

    /// Parse the page into sections.
    ///
    /// Never fails: missing boxes are skipped with a warning and a page with
    /// nothing recognisable yields an empty list.
    pub fn parse(&self, html: &str) -> Vec<NewsSection> {
        if html.trim().is_empty() {
            warn!("Empty HTML content provided to parser");
            return Vec::new();
        }

        let doc = Html::parse_document(html);
        let parsed_at = Utc::now();
        let mut sections = Vec::new();

        for (label, header) in FIXED_SECTIONS {
            if let Some(section) = self.parse_fixed_section(&doc, label, header, parsed_at) {
                sections.push(section);
            }
        }

        sections.extend(self.parse_daily_sections(&doc, parsed_at));

        debug!(
            sections = sections.len(),
            articles = article_count(&sections),
            "Parsed current events page"
        );

        sections
    }

    fn parse_fixed_section(
        &self,
        doc: &Html,
        label: &str,
        header: &str,
        parsed_at: DateTime<Utc>,
    ) -> Option<NewsSection> {
        let selector = match parse_selector(&format!("div[aria-labelledby=\"{label}\"]")) {
            Ok(s) => s,
            Err(e) => {
                warn!(%label, error = %e, "Skipping section");
                return None;
            }
        };

        let Some(container) = doc.select(&selector).next() else {
            warn!("Section '{}' not found", header);
            return None;
        };

        let Some(list) = container.select(&self.selectors.list).next() else {
            warn!("List items under '{}' not found", header);
            return None;
        };

        let articles = self.collect_articles(list, header, parsed_at);
        if articles.is_empty() {
            warn!("No articles found in section '{}'", header);
            return None;
        }

        debug!(count = articles.len(), "Parsed section '{}'", header);
        Some(NewsSection::new(header, articles))
    }

    fn parse_daily_sections(&self, doc: &Html, parsed_at: DateTime<Utc>) -> Vec<NewsSection> {
        let mut sections = Vec::new();
        let mut headings = doc.select(&self.selectors.day_heading).peekable();

        if headings.peek().is_none() {
            warn!("Daily current events sections not found");
            return sections;
        }

        for heading in headings {
            let Some(title) = heading.select(&self.selectors.day_title).next() else {
                warn!("Title element not found in daily section");
                continue;
            };

            let header = self.clean_day_header(&collapse_whitespace(&element_text(title)));

            let day_list = heading
                .parent()
                .and_then(ElementRef::wrap)
                .and_then(|parent| parent.select(&self.selectors.day_list).next());

            let Some(day_list) = day_list else {
                warn!("List items under '{}' not found", header);
                continue;
            };

            let articles = self.collect_articles(day_list, &header, parsed_at);
            if !articles.is_empty() {
                debug!(count = articles.len(), "Parsed daily section '{}'", header);
                sections.push(NewsSection::new(header, articles));
            }
        }

        sections
    }

    fn collect_articles(
        &self,
        list: ElementRef<'_>,
        header: &str,
        parsed_at: DateTime<Utc>,
    ) -> Vec<NewsArticle> {
        list.select(&self.selectors.list_item)
            .filter_map(|item| {
                let html_content = self.fix_relative_urls(item.inner_html().trim());
                if html_content.is_empty() {
                    return None;
                }

                let title = collapse_whitespace(&element_text(item));
                let url = self.extract_first_url(&html_content);

                let mut article = NewsArticle::new(header, title, html_content, url);
                article.timestamp = parsed_at;
                Some(article)
            })
            .collect()
    }

    /// Strip a trailing " (Saturday)" style qualifier from a day header
    fn clean_day_header(&self, text: &str) -> String {
        self.weekday_suffix.replace_all(text, "").trim().to_string()
    }

    /// Make site-relative `href="/..."` links absolute
    pub fn fix_relative_urls(&self, html: &str) -> String {
        self.relative_href
            .replace_all(html, |caps: &Captures<'_>| {
                let path = &caps[1];
                let absolute = if path.starts_with("//") {
                    format!("{}:{}", self.base_url.scheme(), path)
                } else {
                    self.base_url
                        .join(path)
                        .map(String::from)
                        .unwrap_or_else(|_| path.to_string())
                };
                format!("href=\"{}\"", absolute)
            })
            .into_owned()
    }

    /// First `href` target in the fragment, or an empty string
    pub fn extract_first_url(&self, html: &str) -> String {
        self.first_href
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_html_entities(m.as_str()).to_string())
            .unwrap_or_default()
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
