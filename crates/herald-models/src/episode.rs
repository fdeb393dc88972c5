//! Episode types.
//!
//! [`SeasonEpisode`] is what the metadata gateway hands back for every entry
//! in a season listing. Providers publish placeholder entries for episodes
//! that have been scheduled but not yet written up; those lack a title,
//! synopsis or still image. Only entries with all three become an
//! [`Episode`], which is the only type the notification path accepts.

use serde::{Deserialize, Serialize};

use crate::ids::EpisodeId;

/// An episode entry as listed by the provider for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEpisode {
    /// Provider episode id.
    pub id: EpisodeId,
    /// Season this episode belongs to.
    pub season_number: u32,
    /// Position within the season.
    pub episode_number: u32,
    /// Episode title, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Episode synopsis, if published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    /// Provider-relative reference to the episode still image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_ref: Option<String>,
}

impl SeasonEpisode {
    /// Returns true if title, synopsis and thumbnail are all present and non-blank.
    pub fn is_eligible(&self) -> bool {
        present(&self.title) && present(&self.synopsis) && present(&self.thumbnail_ref)
    }

    /// Converts into an [`Episode`] if the entry is eligible for notification.
    pub fn into_eligible(self) -> Option<Episode> {
        if !self.is_eligible() {
            return None;
        }
        Some(Episode {
            id: self.id,
            title: self.title?,
            season_number: self.season_number,
            episode_number: self.episode_number,
            synopsis: self.synopsis?,
            thumbnail_ref: self.thumbnail_ref?,
        })
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// A complete, announceable episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub synopsis: String,
    pub thumbnail_ref: String,
}

impl Episode {
    /// Short `S01E05` style code.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season_number, self.episode_number)
    }
}
