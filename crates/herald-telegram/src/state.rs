//! Shared application context for the Telegram bot.
//!
//! Built once at startup and handed to every handler and background task as
//! an `Arc`. Handlers only format and send; everything that touches stores,
//! the provider or the scheduler goes through here.

use std::sync::Arc;

use herald_core::config::{reactions_file, series_file};
use herald_core::directory::Result as DirectoryResult;
use herald_core::{
    AppliedReaction, ChatTransport, DeliveredMessage, DispatchError, EpisodeResolver,
    MetadataGateway, NotificationRenderer, ReactionChange, SeriesDetail, SeriesDirectory,
    SeriesListing, Settings, TallyEngine, TmdbClient,
};
use herald_models::{Episode, EpisodeId, Reaction, SeriesId, UserId};
use herald_persistence::{JsonReactionStore, JsonSeriesStore, ReactionStore, SeriesStore};
use herald_runtime::{Scheduler, SchedulerConfig};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Everything the handlers and the scheduler share.
pub struct HeraldState {
    tally: Arc<TallyEngine>,
    directory: SeriesDirectory,
    resolver: EpisodeResolver,
    scheduler: Arc<Scheduler>,
    transport: Arc<dyn ChatTransport>,
}

impl HeraldState {
    pub fn new(
        config: SchedulerConfig,
        gateway: Arc<dyn MetadataGateway>,
        series: Arc<dyn SeriesStore>,
        reactions: Arc<dyn ReactionStore>,
        renderer: NotificationRenderer,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        let tally = Arc::new(TallyEngine::new(reactions));
        let scheduler = Arc::new(Scheduler::new(
            config,
            Arc::clone(&series),
            Arc::clone(&gateway),
            Arc::clone(&tally),
            renderer,
            Arc::clone(&transport),
        ));

        Self {
            tally,
            directory: SeriesDirectory::new(series, Arc::clone(&gateway)),
            resolver: EpisodeResolver::new(gateway),
            scheduler,
            transport,
        }
    }

    /// Open the on-disk stores and the TMDB client described by `settings`.
    pub async fn open(settings: &Settings, transport: Arc<dyn ChatTransport>) -> Result<Self> {
        let series = Arc::new(JsonSeriesStore::open(series_file()).await?);
        let reactions = Arc::new(JsonReactionStore::open(reactions_file()).await?);
        let gateway = Arc::new(TmdbClient::new(
            &settings.tmdb_api_url,
            settings.tmdb_api_key.clone(),
        )?);

        info!(api = %settings.tmdb_api_url, "State opened");

        Ok(Self::new(
            SchedulerConfig::from(settings),
            gateway,
            series,
            reactions,
            NotificationRenderer::new(settings.tmdb_image_url.clone()),
            transport,
        ))
    }

    pub fn scheduler(&self) -> Arc<Scheduler> {
        Arc::clone(&self.scheduler)
    }

    pub async fn add_series(&self, id: &SeriesId) -> DirectoryResult<String> {
        self.directory.add_series(id).await
    }

    /// Stop tracking a series and drop its watermark.
    pub async fn remove_series(&self, id: &SeriesId) -> DirectoryResult<()> {
        self.directory.remove_series(id).await?;
        self.scheduler.forget(id).await;
        Ok(())
    }

    pub async fn list_series(&self) -> DirectoryResult<Vec<SeriesListing>> {
        self.directory.list_series().await
    }

    pub async fn series_detail(&self, id: &SeriesId) -> DirectoryResult<SeriesDetail> {
        self.directory.series_detail(id).await
    }

    /// Send the latest eligible episode of a series to `chat_id`.
    ///
    /// Returns `Ok(None)` when the series has no eligible episode. The
    /// watermark is left alone; this is an on-demand view, not a detection.
    pub async fn announce_latest(
        &self,
        chat_id: i64,
        id: &SeriesId,
    ) -> std::result::Result<Option<Episode>, DispatchError> {
        let Some(episode) = self.resolver.resolve_latest(id).await else {
            debug!(series_id = %id, "No latest episode to send");
            return Ok(None);
        };

        self.scheduler
            .announce(chat_id, id, episode.clone())
            .await?;
        Ok(Some(episode))
    }

    /// Apply a reaction tap and refresh the buttons of `message`.
    ///
    /// The store mutation is final once this returns `Ok`; the button refresh
    /// is best effort.
    pub async fn react(
        &self,
        message: Option<DeliveredMessage>,
        episode_id: &EpisodeId,
        user_id: UserId,
        reaction: Reaction,
    ) -> herald_persistence::Result<AppliedReaction> {
        let applied = self
            .tally
            .apply_reaction(episode_id, user_id, reaction)
            .await?;

        if applied.change == ReactionChange::Unchanged {
            return Ok(applied);
        }

        if let Some(message) = message {
            if let Err(e) = self
                .transport
                .refresh_reactions(message, episode_id, &applied.tally)
                .await
            {
                warn!(
                    episode_id = %episode_id,
                    message_id = message.message_id,
                    error = %e,
                    "Failed to refresh reaction buttons"
                );
            }
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::gateway::{GatewayError, Result as GatewayResult};
    use herald_core::{DirectoryError, EpisodeNotification};
    use herald_models::{ReactionTally, SeasonEpisode, SeriesInfo, SeriesSummary};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    struct OneSeries;

    #[async_trait]
    impl MetadataGateway for OneSeries {
        async fn series_summary(&self, id: &SeriesId) -> GatewayResult<SeriesSummary> {
            if id.as_str() != "1399" {
                return Err(GatewayError::NotFound(id.to_string()));
            }
            Ok(SeriesSummary {
                display_name: "Game of Thrones".to_string(),
                aired_seasons: vec![1],
            })
        }

        async fn season_episodes(&self, _id: &SeriesId, season: u32) -> GatewayResult<Vec<SeasonEpisode>> {
            Ok(vec![SeasonEpisode {
                id: EpisodeId::new("63056"),
                season_number: season,
                episode_number: 1,
                title: Some("Winter Is Coming".to_string()),
                synopsis: Some("Lord Stark is troubled.".to_string()),
                thumbnail_ref: Some("/still.jpg".to_string()),
            }])
        }

        async fn series(&self, id: &SeriesId) -> GatewayResult<SeriesInfo> {
            self.series_summary(id).await.map(|s| SeriesInfo {
                display_name: s.display_name,
            })
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<EpisodeNotification>>,
        refreshed: Mutex<Vec<ReactionTally>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_episode(
            &self,
            chat_id: i64,
            notification: &EpisodeNotification,
        ) -> std::result::Result<DeliveredMessage, DispatchError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(DeliveredMessage {
                chat_id,
                message_id: 1,
            })
        }

        async fn refresh_reactions(
            &self,
            _message: DeliveredMessage,
            _episode_id: &EpisodeId,
            tally: &ReactionTally,
        ) -> std::result::Result<(), DispatchError> {
            self.refreshed.lock().unwrap().push(*tally);
            Ok(())
        }
    }

    async fn state() -> (HeraldState, Arc<RecordingTransport>, TempDir) {
        let dir = tempdir().unwrap();
        let series = Arc::new(JsonSeriesStore::open(dir.path().join("series.json")).await.unwrap());
        let reactions = Arc::new(
            JsonReactionStore::open(dir.path().join("reactions.json"))
                .await
                .unwrap(),
        );
        let transport = Arc::new(RecordingTransport::default());
        let state = HeraldState::new(
            SchedulerConfig::new().with_chat_id(-100),
            Arc::new(OneSeries),
            series,
            reactions,
            NotificationRenderer::new("https://img"),
            transport.clone(),
        );
        (state, transport, dir)
    }

    fn message() -> Option<DeliveredMessage> {
        Some(DeliveredMessage {
            chat_id: -100,
            message_id: 1,
        })
    }

    #[tokio::test]
    async fn test_remove_series_clears_watermark() {
        let (state, transport, _dir) = state().await;
        state.add_series(&"1399".into()).await.unwrap();
        state.scheduler().run_tick().await.unwrap();
        assert_eq!(transport.sent.lock().unwrap().len(), 1);

        state.remove_series(&"1399".into()).await.unwrap();

        assert!(state.scheduler().watermark().is_empty().await);
        assert!(matches!(
            state.remove_series(&"1399".into()).await,
            Err(DirectoryError::NotTracked(_))
        ));
    }

    #[tokio::test]
    async fn test_announce_latest_sends_without_advancing_watermark() {
        let (state, transport, _dir) = state().await;

        let episode = state.announce_latest(42, &"1399".into()).await.unwrap();

        assert_eq!(episode.unwrap().id, EpisodeId::new("63056"));
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].series_name, "Game of Thrones");
        assert_eq!(sent[0].photo_url, "https://img/still.jpg");
        assert!(state.scheduler().watermark().is_empty().await);
    }

    #[tokio::test]
    async fn test_announce_latest_unknown_series() {
        let (state, transport, _dir) = state().await;

        let episode = state.announce_latest(42, &"777".into()).await.unwrap();

        assert!(episode.is_none());
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_react_refreshes_only_on_change() {
        let (state, transport, _dir) = state().await;
        let episode = EpisodeId::new("63056");

        state.react(message(), &episode, UserId(1), Reaction::Like).await.unwrap();
        state.react(message(), &episode, UserId(1), Reaction::Like).await.unwrap();
        let applied = state
            .react(message(), &episode, UserId(1), Reaction::Angry)
            .await
            .unwrap();

        assert_eq!(applied.tally, ReactionTally { like: 0, love: 0, angry: 1 });
        let refreshed = transport.refreshed.lock().unwrap();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(refreshed[1], applied.tally);
    }

    #[tokio::test]
    async fn test_react_without_message_still_counts() {
        let (state, transport, _dir) = state().await;

        let applied = state
            .react(None, &EpisodeId::new("63056"), UserId(5), Reaction::Love)
            .await
            .unwrap();

        assert_eq!(applied.tally.love, 1);
        assert!(transport.refreshed.lock().unwrap().is_empty());
    }
}
