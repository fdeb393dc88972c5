//! Series types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EpisodeId, SeriesId};

/// A series the bot is polling for new episodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSeries {
    /// Provider series id.
    pub id: SeriesId,

    /// Last episode announced for this series, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<EpisodeId>,

    /// When the series was added.
    pub added_at: DateTime<Utc>,
}

impl TrackedSeries {
    /// Creates a new tracked series entry.
    pub fn new(id: impl Into<SeriesId>) -> Self {
        Self {
            id: id.into(),
            last_notified: None,
            added_at: Utc::now(),
        }
    }
}

/// Display information for a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub display_name: String,
}

/// Series summary used to walk its seasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub display_name: String,
    /// Season numbers that have started airing, ascending.
    pub aired_seasons: Vec<u32>,
}
