//! Reaction types
//!
//! The aggregate counters owned by the counter service, and the per-device
//! "already reacted" flags owned by local storage. The two are correlated
//! only by slug.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of reaction a reader can leave on an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Clap,
    Party,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 4] = [
        ReactionKind::Like,
        ReactionKind::Love,
        ReactionKind::Clap,
        ReactionKind::Party,
    ];

    /// Counter field name shared by the aggregate and the update request
    pub fn counter_field(self) -> &'static str {
        match self {
            ReactionKind::Like => "like_count",
            ReactionKind::Love => "love_count",
            ReactionKind::Clap => "clap_count",
            ReactionKind::Party => "party_count",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Love => "love",
            ReactionKind::Clap => "clap",
            ReactionKind::Party => "party",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" | "liked" => Ok(ReactionKind::Like),
            "love" | "loved" => Ok(ReactionKind::Love),
            "clap" | "clapped" => Ok(ReactionKind::Clap),
            "party" | "partied" => Ok(ReactionKind::Party),
            other => Err(format!(
                "unknown reaction '{}' (expected like, love, clap or party)",
                other
            )),
        }
    }
}

/// Whether a reaction is being added or taken back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increment,
    Decrement,
}

/// Server-side reaction counters for one article
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAggregate {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub love_count: u64,
    #[serde(default)]
    pub clap_count: u64,
    #[serde(default)]
    pub party_count: u64,
}

impl ReactionAggregate {
    pub fn get(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Like => self.like_count,
            ReactionKind::Love => self.love_count,
            ReactionKind::Clap => self.clap_count,
            ReactionKind::Party => self.party_count,
        }
    }

    fn slot(&mut self, kind: ReactionKind) -> &mut u64 {
        match kind {
            ReactionKind::Like => &mut self.like_count,
            ReactionKind::Love => &mut self.love_count,
            ReactionKind::Clap => &mut self.clap_count,
            ReactionKind::Party => &mut self.party_count,
        }
    }

    /// Apply one increment or decrement; counters never go below zero
    pub fn apply(&mut self, kind: ReactionKind, direction: Direction) {
        let slot = self.slot(kind);
        *slot = match direction {
            Direction::Increment => slot.saturating_add(1),
            Direction::Decrement => slot.saturating_sub(1),
        };
    }

    pub fn total(&self) -> u64 {
        ReactionKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }
}

fn default_has_read() -> bool {
    true
}

/// This device's reaction state for one article, as persisted locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionFlagSet {
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub loved: bool,
    #[serde(default)]
    pub clapped: bool,
    #[serde(default)]
    pub partied: bool,
    /// A reader who got as far as loading the flags has read the article
    #[serde(default = "default_has_read")]
    pub has_read: bool,
}

impl Default for ReactionFlagSet {
    fn default() -> Self {
        Self {
            liked: false,
            loved: false,
            clapped: false,
            partied: false,
            has_read: default_has_read(),
        }
    }
}

impl ReactionFlagSet {
    pub fn get(&self, kind: ReactionKind) -> bool {
        match kind {
            ReactionKind::Like => self.liked,
            ReactionKind::Love => self.loved,
            ReactionKind::Clap => self.clapped,
            ReactionKind::Party => self.partied,
        }
    }

    pub fn set(&mut self, kind: ReactionKind, value: bool) {
        match kind {
            ReactionKind::Like => self.liked = value,
            ReactionKind::Love => self.loved = value,
            ReactionKind::Clap => self.clapped = value,
            ReactionKind::Party => self.partied = value,
        }
    }

    /// Flip one flag, returning its new value
    pub fn toggle(&mut self, kind: ReactionKind) -> bool {
        let value = !self.get(kind);
        self.set(kind, value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults() {
        let flags = ReactionFlagSet::default();
        assert!(!flags.liked && !flags.loved && !flags.clapped && !flags.partied);
        assert!(flags.has_read);
    }

    #[test]
    fn test_flag_toggle() {
        let mut flags = ReactionFlagSet::default();
        assert!(flags.toggle(ReactionKind::Clap));
        assert!(flags.clapped);
        assert!(!flags.toggle(ReactionKind::Clap));
        assert_eq!(flags, ReactionFlagSet::default());
    }

    #[test]
    fn test_flag_serde_keys() {
        let json = serde_json::to_value(ReactionFlagSet::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "liked": false, "loved": false, "clapped": false, "partied": false, "has_read": true
            })
        );

        let partial: ReactionFlagSet = serde_json::from_str(r#"{"loved": true}"#).unwrap();
        assert!(partial.loved);
        assert!(partial.has_read);
    }

    #[test]
    fn test_aggregate_apply() {
        let mut agg = ReactionAggregate {
            like_count: 3,
            ..Default::default()
        };
        agg.apply(ReactionKind::Like, Direction::Increment);
        assert_eq!(agg.like_count, 4);
        agg.apply(ReactionKind::Party, Direction::Decrement);
        assert_eq!(agg.party_count, 0);
        assert_eq!(agg.total(), 4);
    }

    #[test]
    fn test_aggregate_wire_format() {
        let agg: ReactionAggregate = serde_json::from_str(
            r#"{"like_count": 2, "love_count": 1, "clap_count": 7, "party_count": 0, "view_count": 99}"#,
        )
        .unwrap();
        assert_eq!(agg.get(ReactionKind::Clap), 7);
        assert_eq!(agg.get(ReactionKind::Love), 1);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Like".parse::<ReactionKind>(), Ok(ReactionKind::Like));
        assert_eq!("partied".parse::<ReactionKind>(), Ok(ReactionKind::Party));
        assert!("wow".parse::<ReactionKind>().is_err());
        assert_eq!(ReactionKind::Love.counter_field(), "love_count");
    }
}
