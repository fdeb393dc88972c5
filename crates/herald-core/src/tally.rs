//! Reaction tally engine.
//!
//! Each user holds at most one reaction per episode. Transitions:
//!
//! | existing record | incoming reaction | action    |
//! |-----------------|-------------------|-----------|
//! | none            | any               | insert    |
//! | same value      | same              | no-op     |
//! | different value | different         | overwrite |
//!
//! After every transition the tally is recomputed from the store, so the
//! rendered counts always reflect stored state.

use std::sync::Arc;

use herald_models::{EpisodeId, Reaction, ReactionRecord, ReactionTally, UserId};
use herald_persistence::{ReactionStore, Result};
use tracing::debug;

use crate::keyed_lock::KeyedLocks;

/// What applying a reaction did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    /// First reaction from this user on this episode.
    Inserted,
    /// The user already had this reaction.
    Unchanged,
    /// The user switched from another reaction.
    Changed { from: Reaction },
}

/// Result of [`TallyEngine::apply_reaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedReaction {
    pub change: ReactionChange,
    pub tally: ReactionTally,
}

/// Applies reaction events and computes tallies.
pub struct TallyEngine {
    store: Arc<dyn ReactionStore>,
    locks: KeyedLocks<(EpisodeId, UserId)>,
}

impl TallyEngine {
    pub fn new(store: Arc<dyn ReactionStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Apply `reaction` from `user_id` to `episode_id` and return the new tally.
    pub async fn apply_reaction(
        &self,
        episode_id: &EpisodeId,
        user_id: UserId,
        reaction: Reaction,
    ) -> Result<AppliedReaction> {
        let change = {
            // find + upsert are separate awaits; hold the per-key lock across both
            let _guard = self.locks.lock((episode_id.clone(), user_id)).await;

            match self.store.find_reaction(episode_id, user_id).await? {
                Some(existing) if existing.reaction == reaction => ReactionChange::Unchanged,
                Some(mut existing) => {
                    let from = existing.reaction;
                    existing.reaction = reaction;
                    existing.updated_at = chrono::Utc::now();
                    self.store.upsert_reaction(existing).await?;
                    ReactionChange::Changed { from }
                }
                None => {
                    let record = ReactionRecord::new(episode_id.clone(), user_id, reaction);
                    self.store.upsert_reaction(record).await?;
                    ReactionChange::Inserted
                }
            }
        };

        debug!(
            episode_id = %episode_id,
            user_id = %user_id,
            reaction = %reaction,
            change = ?change,
            "Applied reaction"
        );

        let tally = self.tally(episode_id).await?;
        Ok(AppliedReaction { change, tally })
    }

    /// Current tally for an episode; all zeros when nobody has reacted.
    pub async fn tally(&self, episode_id: &EpisodeId) -> Result<ReactionTally> {
        let counts = self.store.count_by_reaction(episode_id).await?;
        Ok(ReactionTally::from_counts(&counts))
    }
}
