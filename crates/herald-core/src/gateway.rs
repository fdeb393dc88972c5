//! Metadata gateway abstraction.
//!
//! The gateway is the only component that talks to the episode metadata
//! provider. Everything it returns has already been validated into the
//! types from `herald_models`; malformed payloads surface as
//! [`GatewayError::Parse`] rather than leaking half-filled values inward.

use async_trait::async_trait;
use herald_models::{SeasonEpisode, SeriesId, SeriesInfo, SeriesSummary};
use thiserror::Error;

/// Errors returned by a metadata gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider has no such series or season.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request could not be sent or the connection failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider answered with an unexpected status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload was not valid or missed required fields.
    #[error("invalid provider payload: {0}")]
    Parse(String),
}

/// Result type for gateway calls.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Lookups against the episode metadata provider.
#[async_trait]
pub trait MetadataGateway: Send + Sync {
    /// Display name and the aired season numbers (ascending) of a series.
    async fn series_summary(&self, id: &SeriesId) -> Result<SeriesSummary>;

    /// Episodes of one season, in provider order.
    async fn season_episodes(&self, id: &SeriesId, season: u32) -> Result<Vec<SeasonEpisode>>;

    /// Display information for a series.
    async fn series(&self, id: &SeriesId) -> Result<SeriesInfo>;
}
