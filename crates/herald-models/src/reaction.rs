//! Reaction records and tallies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::ids::{EpisodeId, UserId};

/// A reaction a user can leave on an announced episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Love,
    Angry,
}

impl Reaction {
    /// All reactions in button order.
    pub const ALL: [Reaction; 3] = [Reaction::Like, Reaction::Love, Reaction::Angry];

    /// Lowercase name used in callback data and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Love => "love",
            Reaction::Angry => "angry",
        }
    }

    /// Emoji shown on the reaction button.
    pub fn emoji(&self) -> &'static str {
        match self {
            Reaction::Like => "👍",
            Reaction::Love => "❤️",
            Reaction::Angry => "😡",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Reaction::Like),
            "love" => Ok(Reaction::Love),
            "angry" => Ok(Reaction::Angry),
            other => Err(format!("unknown reaction: {}", other)),
        }
    }
}

/// One user's current reaction to one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub episode_id: EpisodeId,
    pub user_id: UserId,
    pub reaction: Reaction,
    /// When the reaction was first left or last changed.
    pub updated_at: DateTime<Utc>,
}

impl ReactionRecord {
    /// Creates a new record stamped with the current time.
    pub fn new(episode_id: EpisodeId, user_id: UserId, reaction: Reaction) -> Self {
        Self {
            episode_id,
            user_id,
            reaction,
            updated_at: Utc::now(),
        }
    }
}

/// Per-reaction counts for a single episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    pub like: u64,
    pub love: u64,
    pub angry: u64,
}

impl ReactionTally {
    /// Builds a tally from grouped counts; missing reactions count as zero.
    pub fn from_counts(counts: &HashMap<Reaction, u64>) -> Self {
        let get = |r: Reaction| counts.get(&r).copied().unwrap_or(0);
        Self {
            like: get(Reaction::Like),
            love: get(Reaction::Love),
            angry: get(Reaction::Angry),
        }
    }

    /// Count for a single reaction.
    pub fn count(&self, reaction: Reaction) -> u64 {
        match reaction {
            Reaction::Like => self.like,
            Reaction::Love => self.love,
            Reaction::Angry => self.angry,
        }
    }

    /// Total number of reactions across all categories.
    pub fn total(&self) -> u64 {
        self.like + self.love + self.angry
    }
}
