//! Inline button payloads.
//!
//! | data              | action                       |
//! |-------------------|------------------------------|
//! | `series_<id>`     | show series detail           |
//! | `remove_<id>`     | stop tracking a series       |
//! | `back_to_list`    | re-render the series list    |
//! | `like_<episode>`  | react to an episode (also `love_`, `angry_`) |

use std::fmt;

use herald_models::{EpisodeId, Reaction, SeriesId};

const BACK_TO_LIST: &str = "back_to_list";

/// A decoded callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    ShowSeries(SeriesId),
    RemoveSeries(SeriesId),
    BackToList,
    React {
        reaction: Reaction,
        episode_id: EpisodeId,
    },
}

impl CallbackAction {
    /// Decode callback data. Unknown prefixes and empty ids yield `None`.
    pub fn parse(data: &str) -> Option<Self> {
        if data == BACK_TO_LIST {
            return Some(Self::BackToList);
        }

        let (prefix, id) = data.split_once('_')?;
        if id.is_empty() {
            return None;
        }

        match prefix {
            "series" => Some(Self::ShowSeries(SeriesId::new(id))),
            "remove" => Some(Self::RemoveSeries(SeriesId::new(id))),
            other => other.parse::<Reaction>().ok().map(|reaction| Self::React {
                reaction,
                episode_id: EpisodeId::new(id),
            }),
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowSeries(id) => write!(f, "series_{}", id),
            Self::RemoveSeries(id) => write!(f, "remove_{}", id),
            Self::BackToList => f.write_str(BACK_TO_LIST),
            Self::React {
                reaction,
                episode_id,
            } => write!(f, "{}_{}", reaction.as_str(), episode_id),
        }
    }
}
