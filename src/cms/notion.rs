//! Notion REST client
//!
//! HTTP implementation of [`CmsClient`] against the Notion public API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{CmsClient, CmsError, CmsResult, DocumentFilter, PageObject, Paginated};
use crate::content::ContentBlock;

/// Configuration for the Notion client
#[derive(Debug, Clone)]
pub struct NotionConfig {
    /// Base URL (e.g., "https://api.notion.com")
    pub base_url: String,
    /// Integration secret
    pub token: String,
    /// Database holding the blog posts
    pub database_id: String,
    /// Value of the `Notion-Version` header
    pub api_version: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Results per listing page (the API caps this at 100)
    pub page_size: u32,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com".to_string(),
            token: String::new(),
            database_id: String::new(),
            api_version: "2022-06-28".to_string(),
            request_timeout_secs: 30,
            page_size: 100,
        }
    }
}

/// Notion REST API client
pub struct NotionClient {
    client: Client,
    config: NotionConfig,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    filter: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
    page_size: u32,
}

impl NotionClient {
    /// Create a new client with the given configuration
    pub fn new(config: NotionConfig) -> CmsResult<Self> {
        if config.token.is_empty() {
            return Err(CmsError::Config("CMS token is not set".into()));
        }
        if config.database_id.is_empty() {
            return Err(CmsError::Config("CMS database id is not set".into()));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> CmsResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CmsError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = response.bytes().await.map_err(map_send_error)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn map_send_error(err: reqwest::Error) -> CmsError {
    if err.is_timeout() {
        CmsError::Timeout
    } else {
        CmsError::Request(err)
    }
}

#[async_trait]
impl CmsClient for NotionClient {
    async fn query_documents(
        &self,
        filter: &DocumentFilter,
        cursor: Option<&str>,
    ) -> CmsResult<Paginated<PageObject>> {
        let url = self.url(&format!(
            "databases/{}/query",
            urlencoding::encode(&self.config.database_id)
        ));
        let body = QueryRequest {
            filter: filter.to_json(),
            start_cursor: cursor,
            page_size: self.config.page_size,
        };

        tracing::debug!(cursor = ?cursor, "Querying CMS documents");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::read_json(response).await
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> CmsResult<Paginated<ContentBlock>> {
        let url = self.url(&format!("blocks/{}/children", urlencoding::encode(block_id)));
        let page_size = self.config.page_size.to_string();

        let mut params = vec![("page_size", page_size.as_str())];
        if let Some(cursor) = cursor {
            params.push(("start_cursor", cursor));
        }

        tracing::debug!(block_id, cursor = ?cursor, "Listing CMS block children");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.api_version)
            .query(&params)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::read_json(response).await
    }
}
