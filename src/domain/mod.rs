pub mod article;
pub mod section;

pub use article::NewsArticle;
pub use section::{article_count, group_into_sections, NewsSection};
