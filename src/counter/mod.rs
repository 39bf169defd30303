//! Counter Service Integration
//!
//! The blog's reaction and page-view counters live behind a small HTTP API:
//!
//! - `GET  /api/reactions/{slug}` returns the current [`ReactionAggregate`]
//! - `POST /api/reactions/{slug}` with `{ "reaction": "<field>", "type": "increment" | "decrement" }`
//! - `POST /api/views/{slug}` registers a page view
//!
//! [`CounterService`] is the seam the reaction tracker talks through;
//! [`HttpCounterClient`] is the HTTP implementation.

mod client;

pub use client::{CounterConfig, HttpCounterClient};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::reactions::{Direction, ReactionAggregate, ReactionKind};

/// Remote reaction counters
#[async_trait]
pub trait CounterService: Send + Sync {
    /// Current aggregate for an article
    async fn fetch_reactions(&self, slug: &str) -> Result<ReactionAggregate, CounterError>;

    /// Increment or decrement one counter of an article
    async fn update_reaction(
        &self,
        slug: &str,
        kind: ReactionKind,
        direction: Direction,
    ) -> Result<(), CounterError>;
}

/// Body of a counter update request
#[derive(Debug, Clone, Serialize)]
pub struct ReactionUpdate {
    pub reaction: &'static str,
    #[serde(rename = "type")]
    pub direction: Direction,
}

impl ReactionUpdate {
    pub fn new(kind: ReactionKind, direction: Direction) -> Self {
        Self {
            reaction: kind.counter_field(),
            direction,
        }
    }
}

/// Errors that can occur when talking to the counter service
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Counter service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,
}
