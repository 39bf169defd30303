//! Reaction Tracker
//!
//! Per-article reaction state: this device's "already reacted" flags from
//! local storage, merged with the server's aggregate counters, which are
//! refreshed on a fixed interval.
//!
//! ## Lifecycle
//!
//! 1. [`ReactionTracker::mount`] marks the tracker hydrated, loads the flags
//!    and starts the background refresh. Without a flag store (no client
//!    context) mounting does nothing.
//! 2. Each action toggles the local flag, patches the cached aggregate, and
//!    then sends the update to the counter service in the background.
//! 3. A failed update is not retried or rolled back; the next successful
//!    refresh replaces the patched aggregate with server truth.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::store::FlagStore;
use super::types::{Direction, ReactionAggregate, ReactionFlagSet, ReactionKind};
use crate::counter::{CounterError, CounterService};

/// Default interval between aggregate refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(25);

/// Tracker behaviour
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub refresh_interval: Duration,
    /// Patch the cached aggregate before the server confirms an update
    pub optimistic: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            optimistic: true,
        }
    }
}

/// Observable state of one article's reactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionState {
    pub flags: ReactionFlagSet,
    /// Last known aggregate; `None` until the first refresh succeeds
    pub reactions: Option<ReactionAggregate>,
    pub hydrated: bool,
}

impl ReactionState {
    pub fn has_reacted(&self, kind: ReactionKind) -> bool {
        self.flags.get(kind)
    }

    pub fn has_liked(&self) -> bool {
        self.flags.liked
    }

    pub fn has_loved(&self) -> bool {
        self.flags.loved
    }

    pub fn has_clapped(&self) -> bool {
        self.flags.clapped
    }

    pub fn has_partied(&self) -> bool {
        self.flags.partied
    }

    /// Displayed count for a reaction kind
    pub fn count(&self, kind: ReactionKind) -> u64 {
        self.reactions.map(|agg| agg.get(kind)).unwrap_or(0)
    }
}

/// Reaction state machine for one article
pub struct ReactionTracker {
    slug: String,
    counter: Arc<dyn CounterService>,
    store: Option<Arc<dyn FlagStore>>,
    state: Arc<RwLock<ReactionState>>,
    config: TrackerConfig,
}

/// Background refresh task; dropping the handle stops it
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop refreshing
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ReactionTracker {
    /// Create a tracker. `store` is the device-local flag storage; pass
    /// `None` where there is no client context.
    pub fn new(
        slug: impl Into<String>,
        counter: Arc<dyn CounterService>,
        store: Option<Arc<dyn FlagStore>>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            slug: slug.into(),
            counter,
            store,
            state: Arc::new(RwLock::new(ReactionState::default())),
            config,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Whether local storage is available
    pub fn is_client(&self) -> bool {
        self.store.is_some()
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> ReactionState {
        self.state.read().await.clone()
    }

    /// Hydrate and start the background refresh
    pub async fn mount(self: &Arc<Self>) -> Option<PollHandle> {
        if !self.is_client() {
            tracing::debug!(slug = %self.slug, "No client context, skipping reaction tracking");
            return None;
        }

        self.hydrate().await;
        Some(self.start_polling())
    }

    /// Mark hydrated and load this device's flags from storage
    pub async fn hydrate(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let flags = store.get(&self.slug).unwrap_or_default();

        let mut state = self.state.write().await;
        state.hydrated = true;
        state.flags = flags;
        tracing::debug!(slug = %self.slug, ?flags, "Reaction flags loaded");
    }

    /// Fetch the aggregate once and merge it into the state
    pub async fn refresh(&self) -> Result<ReactionAggregate, CounterError> {
        let aggregate = self.counter.fetch_reactions(&self.slug).await?;
        self.state.write().await.reactions = Some(aggregate);
        tracing::trace!(slug = %self.slug, total = aggregate.total(), "Reactions refreshed");
        Ok(aggregate)
    }

    /// Start refreshing on the configured interval
    ///
    /// The first refresh runs immediately. Ticks run one after another on a
    /// single task, and ticks missed while a refresh is in flight are
    /// skipped, so responses are never applied out of order.
    pub fn start_polling(self: &Arc<Self>) -> PollHandle {
        let tracker = Arc::clone(self);
        let period = self.config.refresh_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if let Err(e) = tracker.refresh().await {
                    tracing::warn!(slug = %tracker.slug, error = %e, "Reaction refresh failed");
                }
            }
        });

        PollHandle { task }
    }

    pub async fn increment(&self, kind: ReactionKind) -> JoinHandle<()> {
        self.react(kind, Some(Direction::Increment)).await
    }

    pub async fn decrement(&self, kind: ReactionKind) -> JoinHandle<()> {
        self.react(kind, Some(Direction::Decrement)).await
    }

    /// Increment when this device has not reacted yet, decrement otherwise
    pub async fn toggle(&self, kind: ReactionKind) -> JoinHandle<()> {
        self.react(kind, None).await
    }

    /// Apply an action locally, then send it to the counter service
    ///
    /// Without an explicit direction it is taken from the flag being
    /// flipped. The flag toggle and the aggregate patch are visible as soon
    /// as this returns; the returned handle completes when the request does.
    async fn react(&self, kind: ReactionKind, direction: Option<Direction>) -> JoinHandle<()> {
        let direction = {
            let mut state = self.state.write().await;

            let mut flags = match &self.store {
                Some(store) => store.get(&self.slug).unwrap_or_default(),
                None => state.flags,
            };
            let direction = direction.unwrap_or(if flags.get(kind) {
                Direction::Decrement
            } else {
                Direction::Increment
            });

            let flagged = flags.toggle(kind);
            if let Some(store) = &self.store {
                if let Err(e) = store.set(&self.slug, &flags) {
                    tracing::warn!(slug = %self.slug, error = %e, "Failed to persist reaction flags");
                }
            }
            state.flags = flags;

            if self.config.optimistic {
                match state.reactions.as_mut() {
                    Some(aggregate) => aggregate.apply(kind, direction),
                    None => tracing::debug!(slug = %self.slug, "No aggregate yet, skipping optimistic patch"),
                }
            }

            tracing::debug!(slug = %self.slug, %kind, ?direction, flagged, "Reaction applied locally");
            direction
        };

        let counter = Arc::clone(&self.counter);
        let slug = self.slug.clone();
        tokio::spawn(async move {
            if let Err(e) = counter.update_reaction(&slug, kind, direction).await {
                tracing::warn!(
                    slug = %slug,
                    %kind,
                    ?direction,
                    error = %e,
                    "Reaction update failed, next refresh will reconcile"
                );
            }
        })
    }
}
