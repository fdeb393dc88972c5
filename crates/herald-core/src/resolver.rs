//! Latest-episode resolution.
//!
//! Seasons are walked from the most recently aired backward. The first
//! season that contains at least one eligible episode decides the result:
//! its last eligible episode in provider order. Older seasons are not
//! fetched once a result is found.

use std::sync::Arc;

use herald_models::{Episode, SeriesId};
use tracing::{debug, warn};

use crate::gateway::MetadataGateway;

/// Finds the latest complete episode of a series.
#[derive(Clone)]
pub struct EpisodeResolver {
    gateway: Arc<dyn MetadataGateway>,
}

impl EpisodeResolver {
    pub fn new(gateway: Arc<dyn MetadataGateway>) -> Self {
        Self { gateway }
    }

    /// Resolve the latest eligible episode, or `None` if there is none.
    ///
    /// Gateway failures are logged and reported as `None`; the next polling
    /// cycle is the retry.
    pub async fn resolve_latest(&self, series_id: &SeriesId) -> Option<Episode> {
        let summary = match self.gateway.series_summary(series_id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(series_id = %series_id, error = %e, "Failed to fetch series summary");
                return None;
            }
        };

        for &season in summary.aired_seasons.iter().rev() {
            let episodes = match self.gateway.season_episodes(series_id, season).await {
                Ok(episodes) => episodes,
                Err(e) => {
                    warn!(series_id = %series_id, season, error = %e, "Failed to fetch season");
                    return None;
                }
            };

            if let Some(latest) = episodes.into_iter().filter_map(|e| e.into_eligible()).last() {
                debug!(
                    series_id = %series_id,
                    episode_id = %latest.id,
                    code = %latest.code(),
                    "Resolved latest episode"
                );
                return Some(latest);
            }
            debug!(series_id = %series_id, season, "No eligible episode in season");
        }

        debug!(series_id = %series_id, "No eligible episode in any aired season");
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gateway::{GatewayError, Result};
    use async_trait::async_trait;
    use herald_models::{EpisodeId, SeasonEpisode, SeriesInfo, SeriesSummary};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory gateway used by the core tests.
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub names: HashMap<String, String>,
        pub seasons: HashMap<String, Vec<u32>>,
        pub episodes: HashMap<(String, u32), Vec<SeasonEpisode>>,
        pub failing_seasons: Vec<(String, u32)>,
        pub season_calls: Mutex<Vec<(String, u32)>>,
    }

    impl FakeGateway {
        pub fn with_series(mut self, id: &str, name: &str, seasons: &[u32]) -> Self {
            self.names.insert(id.to_string(), name.to_string());
            self.seasons.insert(id.to_string(), seasons.to_vec());
            self
        }

        pub fn with_season(mut self, id: &str, season: u32, episodes: Vec<SeasonEpisode>) -> Self {
            self.episodes.insert((id.to_string(), season), episodes);
            self
        }

        pub fn failing_season(mut self, id: &str, season: u32) -> Self {
            self.failing_seasons.push((id.to_string(), season));
            self
        }
    }

    pub(crate) fn eligible(id: &str, season: u32, number: u32) -> SeasonEpisode {
        SeasonEpisode {
            id: EpisodeId::new(id),
            season_number: season,
            episode_number: number,
            title: Some(format!("Episode {}", number)),
            synopsis: Some("Things happen.".to_string()),
            thumbnail_ref: Some(format!("/{}.jpg", id)),
        }
    }

    pub(crate) fn placeholder(id: &str, season: u32, number: u32) -> SeasonEpisode {
        SeasonEpisode {
            synopsis: None,
            ..eligible(id, season, number)
        }
    }

    #[async_trait]
    impl MetadataGateway for FakeGateway {
        async fn series_summary(&self, id: &SeriesId) -> Result<SeriesSummary> {
            let name = self
                .names
                .get(id.as_str())
                .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
            Ok(SeriesSummary {
                display_name: name.clone(),
                aired_seasons: self.seasons.get(id.as_str()).cloned().unwrap_or_default(),
            })
        }

        async fn season_episodes(&self, id: &SeriesId, season: u32) -> Result<Vec<SeasonEpisode>> {
            let key = (id.to_string(), season);
            self.season_calls.lock().unwrap().push(key.clone());
            if self.failing_seasons.contains(&key) {
                return Err(GatewayError::Http("connection reset".to_string()));
            }
            Ok(self.episodes.get(&key).cloned().unwrap_or_default())
        }

        async fn series(&self, id: &SeriesId) -> Result<SeriesInfo> {
            self.names
                .get(id.as_str())
                .map(|n| SeriesInfo { display_name: n.clone() })
                .ok_or_else(|| GatewayError::NotFound(id.to_string()))
        }
    }

    fn build(gateway: FakeGateway) -> (EpisodeResolver, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        (EpisodeResolver::new(gateway.clone()), gateway)
    }

    #[tokio::test]
    async fn test_latest_is_last_eligible_of_newest_season() {
        let (resolver, _) = build(
            FakeGateway::default()
                .with_series("s", "Show", &[1, 2])
                .with_season("s", 1, vec![eligible("e1", 1, 1)])
                .with_season(
                    "s",
                    2,
                    vec![eligible("e2", 2, 1), eligible("e3", 2, 2), placeholder("e4", 2, 3)],
                ),
        );

        let latest = resolver.resolve_latest(&"s".into()).await.unwrap();
        assert_eq!(latest.id, EpisodeId::new("e3"));
    }

    #[tokio::test]
    async fn test_newer_empty_seasons_are_skipped() {
        let (resolver, gateway) = build(
            FakeGateway::default()
                .with_series("s", "Show", &[1, 2, 3])
                .with_season("s", 1, vec![eligible("e1", 1, 1)])
                .with_season("s", 2, vec![eligible("e2", 2, 1), eligible("e3", 2, 2)])
                .with_season("s", 3, vec![placeholder("e4", 3, 1)]),
        );

        let latest = resolver.resolve_latest(&"s".into()).await.unwrap();
        assert_eq!(latest.id, EpisodeId::new("e3"));

        // Season 1 is never consulted once season 2 answers
        let calls = gateway.season_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("s".to_string(), 3), ("s".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_placeholder_only_newest_season_falls_back() {
        let (resolver, _) = build(
            FakeGateway::default()
                .with_series("s", "Show", &[1, 2])
                .with_season("s", 1, vec![eligible("e1", 1, 1), eligible("e2", 1, 2)])
                .with_season("s", 2, vec![placeholder("e3", 2, 1)]),
        );

        let latest = resolver.resolve_latest(&"s".into()).await.unwrap();
        assert_eq!(latest.id, EpisodeId::new("e2"));
    }

    #[tokio::test]
    async fn test_no_eligible_episode_is_not_found() {
        let (resolver, _) = build(
            FakeGateway::default()
                .with_series("s", "Show", &[1, 2])
                .with_season("s", 1, vec![placeholder("e1", 1, 1)]),
        );

        assert!(resolver.resolve_latest(&"s".into()).await.is_none());
    }

    #[tokio::test]
    async fn test_gateway_failures_are_not_found() {
        let (resolver, _) = build(FakeGateway::default());
        assert!(resolver.resolve_latest(&"missing".into()).await.is_none());

        let (resolver, gateway) = build(
            FakeGateway::default()
                .with_series("s", "Show", &[1, 2])
                .with_season("s", 1, vec![eligible("e1", 1, 1)])
                .failing_season("s", 2),
        );
        assert!(resolver.resolve_latest(&"s".into()).await.is_none());
        assert_eq!(gateway.season_calls.lock().unwrap().len(), 1);
    }
}
