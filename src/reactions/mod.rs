//! Reader Reactions
//!
//! Tracks like/love/clap/party reactions on an article.
//!
//! ## Architecture
//!
//! - **Types**: server aggregate counters and per-device flag sets
//! - **FlagStore**: device-local durable storage for flag sets
//! - **ReactionTracker**: merges both, applies actions optimistically and
//!   refreshes the aggregate in the background
//!
//! ## Data Flow
//!
//! 1. Mount reads the flag set for the slug and starts polling the counter service
//! 2. An action flips the stored flag and patches the cached aggregate
//! 3. The update is sent in the background; the next refresh reconciles

mod store;
mod tracker;
mod types;

pub use store::{FileFlagStore, FlagStore, MemoryFlagStore, StoreError, StoreResult};
pub use tracker::{
    PollHandle, ReactionState, ReactionTracker, TrackerConfig, DEFAULT_REFRESH_INTERVAL,
};
pub use types::{Direction, ReactionAggregate, ReactionFlagSet, ReactionKind};
