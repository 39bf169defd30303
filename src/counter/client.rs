//! Counter service HTTP client

use async_trait::async_trait;
use reqwest::{Client, Response};

use super::{CounterError, CounterService, ReactionUpdate};
use crate::reactions::{Direction, ReactionAggregate, ReactionKind};
use crate::views::ViewService;

/// Configuration for the counter client
#[derive(Debug, Clone)]
pub struct CounterConfig {
    /// Site origin serving `/api/reactions` and `/api/views`
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// HTTP client for the reaction and page-view endpoints
pub struct HttpCounterClient {
    client: Client,
    config: CounterConfig,
}

impl HttpCounterClient {
    pub fn new(config: CounterConfig) -> Result<Self, CounterError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    fn endpoint(&self, resource: &str, slug: &str) -> String {
        format!(
            "{}/api/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            resource,
            urlencoding::encode(slug)
        )
    }

    async fn check(response: Response) -> Result<Response, CounterError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(CounterError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

fn map_send_error(err: reqwest::Error) -> CounterError {
    if err.is_timeout() {
        CounterError::Timeout
    } else if err.is_connect() {
        CounterError::Unavailable
    } else {
        CounterError::Request(err)
    }
}

#[async_trait]
impl CounterService for HttpCounterClient {
    async fn fetch_reactions(&self, slug: &str) -> Result<ReactionAggregate, CounterError> {
        let response = self
            .client
            .get(self.endpoint("reactions", slug))
            .send()
            .await
            .map_err(map_send_error)?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn update_reaction(
        &self,
        slug: &str,
        kind: ReactionKind,
        direction: Direction,
    ) -> Result<(), CounterError> {
        let response = self
            .client
            .post(self.endpoint("reactions", slug))
            .json(&ReactionUpdate::new(kind, direction))
            .send()
            .await
            .map_err(map_send_error)?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ViewService for HttpCounterClient {
    async fn register_view(&self, slug: &str) -> Result<(), CounterError> {
        let response = self
            .client
            .post(self.endpoint("views", slug))
            .send()
            .await
            .map_err(map_send_error)?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CounterConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_endpoints() {
        let client = HttpCounterClient::new(CounterConfig {
            base_url: "https://blog.example.com/".into(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.endpoint("reactions", "hello-world"),
            "https://blog.example.com/api/reactions/hello-world"
        );
        assert_eq!(
            client.endpoint("views", "a b"),
            "https://blog.example.com/api/views/a%20b"
        );
    }
}
