//! TMDB v3 implementation of the metadata gateway.
//!
//! Endpoints used:
//! - `GET /tv/{id}` for the series name and season list
//! - `GET /tv/{id}/season/{n}` for the episodes of a season
//!
//! A season counts as aired once its `air_date` is on or before today (UTC).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use herald_models::{EpisodeId, SeasonEpisode, SeriesId, SeriesInfo, SeriesSummary};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::gateway::{GatewayError, MetadataGateway, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB API client.
#[derive(Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl TmdbClient {
    /// Create a client against `base_url` (e.g. `https://api.themoviedb.org/3/`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| GatewayError::Http(format!("invalid base URL {}: {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Append `segments` to the base path. Each segment is percent-encoded,
    /// so an id can never add path levels or a query of its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Http(format!("base URL cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        let path = segments.join("/");
        debug!(path = %path, "TMDB request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(path.to_string()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Http(e.without_url().to_string()))?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        trace!(path = %path, bytes = body.len(), "TMDB response");
        serde_json::from_str(&body).map_err(|e| GatewayError::Parse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl MetadataGateway for TmdbClient {
    async fn series_summary(&self, id: &SeriesId) -> Result<SeriesSummary> {
        let raw: RawSeries = self.get_json(&["tv", id.as_str()]).await?;
        summary_from_raw(raw, Utc::now().date_naive())
    }

    async fn season_episodes(&self, id: &SeriesId, season: u32) -> Result<Vec<SeasonEpisode>> {
        let raw: RawSeason = self
            .get_json(&["tv", id.as_str(), "season", &season.to_string()])
            .await?;
        episodes_from_raw(raw)
    }

    async fn series(&self, id: &SeriesId) -> Result<SeriesInfo> {
        let raw: RawSeries = self.get_json(&["tv", id.as_str()]).await?;
        let display_name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| GatewayError::Parse("series without a name".to_string()))?;
        Ok(SeriesInfo { display_name })
    }
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    name: Option<String>,
    #[serde(default)]
    seasons: Vec<RawSeasonRef>,
}

#[derive(Debug, Deserialize)]
struct RawSeasonRef {
    season_number: Option<u32>,
    air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeason {
    episodes: Option<Vec<RawEpisode>>,
}

#[derive(Debug, Deserialize)]
struct RawEpisode {
    id: Option<u64>,
    season_number: Option<u32>,
    episode_number: Option<u32>,
    name: Option<String>,
    overview: Option<String>,
    still_path: Option<String>,
}

fn summary_from_raw(raw: RawSeries, today: NaiveDate) -> Result<SeriesSummary> {
    let display_name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| GatewayError::Parse("series without a name".to_string()))?;

    let mut aired_seasons = Vec::new();
    for season in raw.seasons {
        let number = season
            .season_number
            .ok_or_else(|| GatewayError::Parse("season without a number".to_string()))?;
        let aired = season
            .air_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .is_some_and(|d| d <= today);
        if aired {
            aired_seasons.push(number);
        }
    }
    aired_seasons.sort_unstable();
    aired_seasons.dedup();

    Ok(SeriesSummary {
        display_name,
        aired_seasons,
    })
}

fn episodes_from_raw(raw: RawSeason) -> Result<Vec<SeasonEpisode>> {
    let episodes = raw
        .episodes
        .ok_or_else(|| GatewayError::Parse("season without an episode list".to_string()))?;

    episodes
        .into_iter()
        .map(|e| -> Result<SeasonEpisode> {
            let missing = |field: &str| GatewayError::Parse(format!("episode without {}", field));
            Ok(SeasonEpisode {
                id: EpisodeId::new(e.id.ok_or_else(|| missing("id"))?.to_string()),
                season_number: e.season_number.ok_or_else(|| missing("season_number"))?,
                episode_number: e.episode_number.ok_or_else(|| missing("episode_number"))?,
                title: e.name,
                synopsis: e.overview,
                thumbnail_ref: e.still_path,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_summary_keeps_only_aired_seasons() {
        let raw: RawSeries = serde_json::from_str(
            r#"{
                "name": "Severance",
                "seasons": [
                    {"season_number": 2, "air_date": "2025-01-17"},
                    {"season_number": 0, "air_date": null},
                    {"season_number": 1, "air_date": "2022-02-18"},
                    {"season_number": 3, "air_date": "2027-01-01"}
                ]
            }"#,
        )
        .unwrap();

        let summary = summary_from_raw(raw, date("2026-06-01")).unwrap();
        assert_eq!(summary.display_name, "Severance");
        assert_eq!(summary.aired_seasons, vec![1, 2]);
    }

    #[test]
    fn test_summary_without_name_is_parse_error() {
        let raw: RawSeries = serde_json::from_str(r#"{"seasons": []}"#).unwrap();
        let result = summary_from_raw(raw, date("2026-06-01"));
        assert!(matches!(result, Err(GatewayError::Parse(_))));
    }

    #[test]
    fn test_episodes_keep_provider_order_and_placeholders() {
        let raw: RawSeason = serde_json::from_str(
            r#"{
                "episodes": [
                    {"id": 11, "season_number": 1, "episode_number": 1,
                     "name": "Good News About Hell", "overview": "Mark is promoted.",
                     "still_path": "/a.jpg"},
                    {"id": 12, "season_number": 1, "episode_number": 2,
                     "name": "Episode 2", "overview": "", "still_path": null}
                ]
            }"#,
        )
        .unwrap();

        let episodes = episodes_from_raw(raw).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].id, EpisodeId::new("11"));
        assert!(episodes[0].is_eligible());
        assert!(!episodes[1].is_eligible());
    }

    #[test]
    fn test_episode_missing_structural_field_is_parse_error() {
        let raw: RawSeason = serde_json::from_str(
            r#"{"episodes": [{"season_number": 1, "episode_number": 1, "name": "x"}]}"#,
        )
        .unwrap();

        let result = episodes_from_raw(raw);
        assert!(matches!(result, Err(GatewayError::Parse(msg)) if msg.contains("id")));
    }

    #[test]
    fn test_endpoint_appends_key_and_keeps_base_path() {
        let client = TmdbClient::new("https://api.themoviedb.org/3", "secret").unwrap();
        let url = client.endpoint(&["tv", "1399", "season", "2"]).unwrap();

        assert_eq!(url.path(), "/3/tv/1399/season/2");
        assert_eq!(url.query(), Some("api_key=secret"));
    }

    #[test]
    fn test_endpoint_encodes_hostile_ids() {
        let client = TmdbClient::new("https://api.themoviedb.org/3/", "secret").unwrap();

        let url = client.endpoint(&["tv", "1399?x=1"]).unwrap();
        assert_eq!(url.path(), "/3/tv/1399%3Fx=1");
        assert_eq!(url.query(), Some("api_key=secret"));

        let url = client.endpoint(&["tv", "../../movie/550"]).unwrap();
        assert!(url.path().starts_with("/3/tv/"));
        assert!(!url.path().contains("/movie/"));
    }
}
