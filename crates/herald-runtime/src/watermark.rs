//! Last-notified episode per series.

use std::collections::HashMap;

use herald_models::{EpisodeId, SeriesId};
use tokio::sync::RwLock;

/// Process-local map of the last episode announced for each series.
///
/// A series without an entry has never been announced, so any resolved
/// episode counts as new.
#[derive(Debug, Default)]
pub struct Watermark {
    entries: RwLock<HashMap<SeriesId, EpisodeId>>,
}

impl Watermark {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, series_id: &SeriesId) -> Option<EpisodeId> {
        self.entries.read().await.get(series_id).cloned()
    }

    /// True if `episode_id` has not been announced for `series_id` yet.
    pub async fn differs(&self, series_id: &SeriesId, episode_id: &EpisodeId) -> bool {
        self.entries.read().await.get(series_id) != Some(episode_id)
    }

    pub async fn set(&self, series_id: SeriesId, episode_id: EpisodeId) {
        self.entries.write().await.insert(series_id, episode_id);
    }

    pub async fn remove(&self, series_id: &SeriesId) -> Option<EpisodeId> {
        self.entries.write().await.remove(series_id)
    }

    /// Bulk-load entries, overwriting existing ones. Returns how many series were new.
    pub async fn seed(&self, entries: impl IntoIterator<Item = (SeriesId, EpisodeId)>) -> usize {
        let mut map = self.entries.write().await;
        let before = map.len();
        map.extend(entries);
        map.len() - before
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
