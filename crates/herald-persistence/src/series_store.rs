//! Tracked series persistence.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use herald_models::{EpisodeId, SeriesId, TrackedSeries};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::atomic::JsonFile;
use crate::error::{PersistenceError, Result};

/// Storage for the set of tracked series.
///
/// Each method is a single-record operation; implementations make each one
/// atomic on its own but offer no multi-step transactions.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// All tracked series, ordered by id.
    async fn list_tracked(&self) -> Result<Vec<TrackedSeries>>;

    /// Whether `id` is currently tracked.
    async fn is_tracked(&self, id: &SeriesId) -> Result<bool>;

    /// Inserts a new series. Fails with [`PersistenceError::AlreadyExists`] on a duplicate id.
    async fn insert(&self, series: TrackedSeries) -> Result<()>;

    /// Deletes a series. Returns false if it was not tracked.
    async fn delete(&self, id: &SeriesId) -> Result<bool>;

    /// Last episode announced for a series, if recorded.
    async fn last_notified(&self, id: &SeriesId) -> Result<Option<EpisodeId>>;

    /// Records the last episode announced for a series.
    ///
    /// A no-op if the series is no longer tracked.
    async fn record_notified(&self, id: &SeriesId, episode: &EpisodeId) -> Result<()>;
}

/// JSON file backed series store.
///
/// ```text
/// state/series.json
/// {
///   "1399": { "id": "1399", "last_notified": "63056", "added_at": "..." }
/// }
/// ```
pub struct JsonSeriesStore {
    file: JsonFile,
    series: RwLock<BTreeMap<SeriesId, TrackedSeries>>,
}

impl JsonSeriesStore {
    /// Opens the store at `path`, loading any existing entries.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = JsonFile::new(path);
        let series: BTreeMap<SeriesId, TrackedSeries> = file.load_or_default()?;
        info!(count = series.len(), path = %file.path().display(), "Loaded tracked series");

        Ok(Self {
            file,
            series: RwLock::new(series),
        })
    }
}

#[async_trait]
impl SeriesStore for JsonSeriesStore {
    async fn list_tracked(&self) -> Result<Vec<TrackedSeries>> {
        Ok(self.series.read().await.values().cloned().collect())
    }

    async fn is_tracked(&self, id: &SeriesId) -> Result<bool> {
        Ok(self.series.read().await.contains_key(id))
    }

    async fn insert(&self, series: TrackedSeries) -> Result<()> {
        let mut map = self.series.write().await;
        if map.contains_key(&series.id) {
            return Err(PersistenceError::AlreadyExists {
                kind: "series".to_string(),
                id: series.id.to_string(),
            });
        }
        debug!(series_id = %series.id, "Inserting tracked series");
        let id = series.id.clone();
        map.insert(id.clone(), series);
        if let Err(e) = self.file.save(&*map) {
            map.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, id: &SeriesId) -> Result<bool> {
        let mut map = self.series.write().await;
        let Some(removed) = map.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = self.file.save(&*map) {
            map.insert(id.clone(), removed);
            return Err(e);
        }
        debug!(series_id = %id, "Deleted tracked series");
        Ok(true)
    }

    async fn last_notified(&self, id: &SeriesId) -> Result<Option<EpisodeId>> {
        Ok(self
            .series
            .read()
            .await
            .get(id)
            .and_then(|s| s.last_notified.clone()))
    }

    async fn record_notified(&self, id: &SeriesId, episode: &EpisodeId) -> Result<()> {
        let mut map = self.series.write().await;
        let Some(entry) = map.get_mut(id) else {
            return Ok(());
        };
        if entry.last_notified.as_ref() == Some(episode) {
            return Ok(());
        }
        let previous = entry.last_notified.replace(episode.clone());
        if let Err(e) = self.file.save(&*map) {
            if let Some(entry) = map.get_mut(id) {
                entry.last_notified = previous;
            }
            return Err(e);
        }
        Ok(())
    }
}
