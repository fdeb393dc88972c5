//! New-episode detection loop.
//!
//! Every tick reads the tracked series and checks each one concurrently:
//! resolve the latest eligible episode, compare it with the watermark, and
//! announce it if it differs. The watermark only advances after the chat
//! transport accepted the announcement, so a failed send is retried on the
//! next tick.

use std::sync::Arc;

use futures::future::join_all;
use herald_core::directory::fallback_name;
use herald_core::{
    ChatTransport, DeliveredMessage, DispatchError, EpisodeResolver, MetadataGateway,
    NotificationRenderer, TallyEngine,
};
use herald_models::{Episode, EpisodeId, ReactionTally, SeriesId};
use herald_persistence::SeriesStore;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::in_flight::InFlight;
use crate::watermark::Watermark;

/// What a single series check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A new episode was announced.
    Notified(EpisodeId),
    /// The latest episode was already announced.
    Unchanged,
    /// No eligible episode, or the provider failed.
    NotFound,
    /// Another check for this series is still running.
    Busy,
    /// The chat transport rejected the announcement.
    DispatchFailed,
}

/// Outcomes of one tick, in tracked-series order.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub outcomes: Vec<(SeriesId, CheckOutcome)>,
}

impl TickReport {
    /// Episodes announced during the tick.
    pub fn notified(&self) -> Vec<(&SeriesId, &EpisodeId)> {
        self.outcomes
            .iter()
            .filter_map(|(series, outcome)| match outcome {
                CheckOutcome::Notified(episode) => Some((series, episode)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, outcome: &CheckOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| o == outcome).count()
    }
}

/// Drives new-episode detection for all tracked series.
pub struct Scheduler {
    config: SchedulerConfig,
    store: Arc<dyn SeriesStore>,
    gateway: Arc<dyn MetadataGateway>,
    resolver: EpisodeResolver,
    tally: Arc<TallyEngine>,
    renderer: NotificationRenderer,
    transport: Arc<dyn ChatTransport>,
    watermark: Watermark,
    in_flight: InFlight,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        store: Arc<dyn SeriesStore>,
        gateway: Arc<dyn MetadataGateway>,
        tally: Arc<TallyEngine>,
        renderer: NotificationRenderer,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            config,
            store,
            resolver: EpisodeResolver::new(Arc::clone(&gateway)),
            gateway,
            tally,
            renderer,
            transport,
            watermark: Watermark::new(),
            in_flight: InFlight::new(),
        }
    }

    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    /// Load last-notified episodes from the store into the watermark.
    ///
    /// Does nothing when the persisted watermark is disabled.
    pub async fn seed_from_store(&self) -> Result<usize> {
        if !self.config.persist_watermark {
            return Ok(0);
        }

        let entries: Vec<(SeriesId, EpisodeId)> = self
            .store
            .list_tracked()
            .await?
            .into_iter()
            .filter_map(|s| s.last_notified.map(|episode| (s.id, episode)))
            .collect();

        let seeded = self.watermark.seed(entries).await;
        info!(count = seeded, "Seeded watermark from store");
        Ok(seeded)
    }

    /// Drop the watermark of a series that is no longer tracked.
    pub async fn forget(&self, series_id: &SeriesId) {
        if self.watermark.remove(series_id).await.is_some() {
            debug!(series_id = %series_id, "Cleared watermark");
        }
    }

    /// Check one series and announce its latest episode if it is new.
    pub async fn check_series(&self, series_id: &SeriesId) -> CheckOutcome {
        let Some(_busy) = self.in_flight.try_acquire(series_id) else {
            debug!(series_id = %series_id, "Check already in flight, skipping");
            return CheckOutcome::Busy;
        };

        let Some(episode) = self.resolver.resolve_latest(series_id).await else {
            return CheckOutcome::NotFound;
        };

        if !self.watermark.differs(series_id, &episode.id).await {
            debug!(series_id = %series_id, episode_id = %episode.id, "Already announced");
            return CheckOutcome::Unchanged;
        }

        let episode_id = episode.id.clone();
        match self.announce(self.config.chat_id, series_id, episode).await {
            Ok(message) => {
                info!(
                    series_id = %series_id,
                    episode_id = %episode_id,
                    message_id = message.message_id,
                    "Announced new episode"
                );
                self.advance(series_id, &episode_id).await;
                CheckOutcome::Notified(episode_id)
            }
            Err(e) => {
                warn!(
                    series_id = %series_id,
                    episode_id = %episode_id,
                    error = %e,
                    "Failed to dispatch announcement"
                );
                CheckOutcome::DispatchFailed
            }
        }
    }

    /// Render and send an episode announcement with its current tally.
    pub async fn announce(
        &self,
        chat_id: i64,
        series_id: &SeriesId,
        episode: Episode,
    ) -> std::result::Result<DeliveredMessage, DispatchError> {
        let series_name = match self.gateway.series(series_id).await {
            Ok(info) => info.display_name,
            Err(e) => {
                warn!(series_id = %series_id, error = %e, "Failed to resolve series name");
                fallback_name(series_id)
            }
        };

        let tally = match self.tally.tally(&episode.id).await {
            Ok(tally) => tally,
            Err(e) => {
                warn!(episode_id = %episode.id, error = %e, "Failed to read tally");
                ReactionTally::default()
            }
        };

        let notification = self.renderer.render(series_name, episode, tally);
        self.transport.send_episode(chat_id, &notification).await
    }

    async fn advance(&self, series_id: &SeriesId, episode_id: &EpisodeId) {
        self.watermark
            .set(series_id.clone(), episode_id.clone())
            .await;

        // Set before the check: a removal that raced the send either shows up
        // here or forgets the entry after us
        match self.store.is_tracked(series_id).await {
            Ok(true) => {}
            Ok(false) => {
                self.watermark.remove(series_id).await;
                debug!(series_id = %series_id, "Series removed during check, watermark dropped");
                return;
            }
            Err(e) => warn!(series_id = %series_id, error = %e, "Failed to confirm series is tracked"),
        }

        if self.config.persist_watermark {
            if let Err(e) = self.store.record_notified(series_id, episode_id).await {
                warn!(series_id = %series_id, error = %e, "Failed to persist watermark");
            }
        }
    }

    /// Run one polling cycle over all tracked series.
    ///
    /// A store read failure aborts the tick; per-series failures do not.
    pub async fn run_tick(&self) -> Result<TickReport> {
        let tracked = self.store.list_tracked().await?;
        debug!(count = tracked.len(), "Checking tracked series");

        let checks = tracked.iter().map(|s| self.check_series(&s.id));
        let results = join_all(checks).await;

        Ok(TickReport {
            outcomes: tracked.into_iter().map(|s| s.id).zip(results).collect(),
        })
    }

    /// Tick on the configured cadence until `shutdown` flips to true.
    ///
    /// Each tick runs in its own task so a slow provider never delays the
    /// next tick; the in-flight set keeps overlapping ticks apart.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.interval.as_secs(),
            chat_id = self.config.chat_id,
            "Starting scheduler"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let scheduler = Arc::clone(&self);
                    tokio::spawn(async move {
                        match scheduler.run_tick().await {
                            Ok(report) => {
                                let notified = report.notified().len();
                                if notified > 0 {
                                    info!(notified, "Tick complete");
                                } else {
                                    debug!(checked = report.outcomes.len(), "Tick complete");
                                }
                            }
                            Err(e) => warn!(error = %e, "Tick aborted"),
                        }
                    });
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Scheduler received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }
}
