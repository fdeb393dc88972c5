//! Reaction persistence.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use herald_models::{EpisodeId, Reaction, ReactionRecord, UserId};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::atomic::JsonFile;
use crate::error::Result;

/// Storage for per-(episode, user) reaction records.
#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// The user's current reaction to an episode, if any.
    async fn find_reaction(
        &self,
        episode_id: &EpisodeId,
        user_id: UserId,
    ) -> Result<Option<ReactionRecord>>;

    /// Inserts the record, or replaces the existing one for the same (episode, user).
    async fn upsert_reaction(&self, record: ReactionRecord) -> Result<()>;

    /// Number of records per reaction for an episode. Reactions nobody picked are absent.
    async fn count_by_reaction(&self, episode_id: &EpisodeId) -> Result<HashMap<Reaction, u64>>;
}

type Key = (EpisodeId, UserId);

/// JSON file backed reaction store.
///
/// Records are kept as a flat list on disk and indexed by
/// `(episode_id, user_id)` in memory.
pub struct JsonReactionStore {
    file: JsonFile,
    records: RwLock<BTreeMap<Key, ReactionRecord>>,
}

impl JsonReactionStore {
    /// Opens the store at `path`, loading any existing records.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = JsonFile::new(path);
        let list: Vec<ReactionRecord> = file.load_or_default()?;

        let records: BTreeMap<Key, ReactionRecord> = list
            .into_iter()
            .map(|r| ((r.episode_id.clone(), r.user_id), r))
            .collect();
        info!(count = records.len(), path = %file.path().display(), "Loaded reactions");

        Ok(Self {
            file,
            records: RwLock::new(records),
        })
    }
}

#[async_trait]
impl ReactionStore for JsonReactionStore {
    async fn find_reaction(
        &self,
        episode_id: &EpisodeId,
        user_id: UserId,
    ) -> Result<Option<ReactionRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&(episode_id.clone(), user_id)).cloned())
    }

    async fn upsert_reaction(&self, record: ReactionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        debug!(
            episode_id = %record.episode_id,
            user_id = %record.user_id,
            reaction = %record.reaction,
            "Upserting reaction"
        );
        let key = (record.episode_id.clone(), record.user_id);
        let previous = records.insert(key.clone(), record);

        let list: Vec<&ReactionRecord> = records.values().collect();
        if let Err(e) = self.file.save(&list) {
            // Memory must not run ahead of the file
            match previous {
                Some(previous) => records.insert(key, previous),
                None => records.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn count_by_reaction(&self, episode_id: &EpisodeId) -> Result<HashMap<Reaction, u64>> {
        let records = self.records.read().await;
        let mut counts = HashMap::new();
        for record in records.values().filter(|r| &r.episode_id == episode_id) {
            *counts.entry(record.reaction).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
