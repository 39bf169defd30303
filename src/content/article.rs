//! Article page
//!
//! A loaded document and its full-page rendering.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::markup::Markup;
use super::render::Renderer;
use super::types::ContentBlock;

/// Default date format: weekday, month name, day and year
pub const DEFAULT_DATE_FORMAT: &str = "%A, %B %-d, %Y";

/// A published document with its ordered top-level blocks
#[derive(Debug, Clone)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub published: Option<NaiveDate>,
    pub last_edited: Option<DateTime<Utc>>,
    pub blocks: Vec<ContentBlock>,
}

/// Listing entry for a published document
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub published: Option<NaiveDate>,
}

impl Article {
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            published: self.published,
        }
    }

    /// Total number of blocks, nested toggle children included
    pub fn block_count(&self) -> usize {
        fn count(blocks: &[ContentBlock]) -> usize {
            blocks
                .iter()
                .map(|block| 1 + block.children().map(count).unwrap_or(0))
                .sum()
        }
        count(&self.blocks)
    }
}

/// Format `date` with a strftime-style `format`
///
/// Returns `None` when the format holds an invalid specifier or one a date
/// cannot supply, such as `%H`.
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

/// Whether `format` can render a calendar date
pub fn is_valid_date_format(format: &str) -> bool {
    NaiveDate::from_ymd_opt(2000, 1, 1).is_some_and(|sample| format_date(sample, format).is_some())
}

fn date_line(label: &str, date: NaiveDate, format: &str) -> String {
    let formatted = format_date(date, format).unwrap_or_else(|| {
        tracing::warn!(format, "Unusable date format, using the default");
        format_date(date, DEFAULT_DATE_FORMAT).unwrap_or_else(|| date.to_string())
    });
    format!("{} {}", label, formatted)
}

/// Render the full article page
pub fn render_article(article: &Article, renderer: &Renderer, date_format: &str) -> Markup {
    let mut body = Markup::new();
    body.push_element("h1", &[], Markup::text(&article.title));

    if let Some(published) = article.published {
        let line = date_line("Published", published, date_format);
        body.push_element("h4", &[], Markup::text(&line));
    }
    if let Some(edited) = article.last_edited {
        let line = date_line("Last edited", edited.date_naive(), date_format);
        body.push_element("h4", &[], Markup::text(&line));
    }

    body.push(renderer.render_all(&article.blocks));
    body.push_element("a", &[("href", "/blog")], Markup::text("\u{2190} Back to the blog"));

    let mut inner = Markup::new();
    inner.push_element("article", &[("class", "prose-lg")], body);

    let mut page = Markup::new();
    page.push_element("article", &[("class", "max-w-7xl mx-auto")], inner);
    page
}
