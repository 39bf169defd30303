//! CMS Integration
//!
//! Loads published documents and their block trees from a blocks-based
//! document API.
//!
//! ## Architecture
//!
//! - **CmsClient**: narrow trait over the two calls the blog needs
//!   (document query, block-children listing), both cursor-paginated
//! - **NotionClient**: HTTP implementation of [`CmsClient`]
//! - **PageLoader**: slug resolution and pagination on top of any client

mod error;
mod loader;
mod notion;

pub use error::{CmsError, CmsResult};
pub use loader::PageLoader;
pub use notion::{NotionClient, NotionConfig};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::content::ContentBlock;

/// Document property holding the title
pub const TITLE_PROPERTY: &str = "Name";
/// Document property holding the publication date
pub const PUBLISHED_PROPERTY: &str = "Published";
/// Document property holding the last-edited timestamp
pub const LAST_EDITED_PROPERTY: &str = "LastEdited";

/// Document API used by the loader
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Query one page of documents matching the filter
    async fn query_documents(
        &self,
        filter: &DocumentFilter,
        cursor: Option<&str>,
    ) -> CmsResult<Paginated<PageObject>>;

    /// List one page of the children of a document or block
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> CmsResult<Paginated<ContentBlock>>;
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> Paginated<T> {
    /// Cursor to continue from, if there is more
    pub fn continuation(&self) -> Option<&str> {
        if self.has_more {
            self.next_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Which documents count as published blog posts
#[derive(Debug, Clone)]
pub struct DocumentFilter {
    pub status: String,
    pub post_type: String,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            status: "Published".to_string(),
            post_type: "Personal".to_string(),
        }
    }
}

impl DocumentFilter {
    /// Query filter in the document API's compound-filter format
    pub fn to_json(&self) -> Value {
        json!({
            "and": [
                { "property": "Status", "select": { "equals": self.status } },
                { "property": "Type", "select": { "equals": self.post_type } },
            ]
        })
    }
}

/// A document as returned by the query endpoint
///
/// Properties are kept as raw JSON and read best-effort; a missing or
/// oddly-shaped property reads as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageObject {
    #[serde(default)]
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl PageObject {
    pub fn is_page(&self) -> bool {
        self.object == "page"
    }

    /// Plain text of the first title span
    pub fn title(&self) -> Option<&str> {
        self.properties
            .get(TITLE_PROPERTY)?
            .get("title")?
            .get(0)?
            .get("plain_text")?
            .as_str()
    }

    pub fn published(&self) -> Option<NaiveDate> {
        let start = self
            .properties
            .get(PUBLISHED_PROPERTY)?
            .get("date")?
            .get("start")?
            .as_str()?;
        NaiveDate::parse_from_str(start.get(..10)?, "%Y-%m-%d").ok()
    }

    pub fn last_edited(&self) -> Option<DateTime<Utc>> {
        let raw = self
            .properties
            .get(LAST_EDITED_PROPERTY)
            .and_then(|prop| prop.get("last_edited_time"))
            .and_then(Value::as_str)
            .or(self.last_edited_time.as_deref())?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
