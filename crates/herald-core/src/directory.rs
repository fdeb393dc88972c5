//! Tracked series directory.
//!
//! User-facing add/remove/list operations on the tracked series set. Display
//! names are looked up from the provider every time they are shown; a failed
//! lookup degrades to a placeholder name instead of failing the listing.

use std::sync::Arc;

use futures::future::join_all;
use herald_models::{Episode, SeriesId, TrackedSeries};
use herald_persistence::{PersistenceError, SeriesStore};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gateway::{GatewayError, MetadataGateway};
use crate::keyed_lock::KeyedLocks;
use crate::resolver::EpisodeResolver;

/// Outcomes of directory operations other than success.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The series is already being tracked.
    #[error("series {0} is already tracked")]
    AlreadyTracked(SeriesId),

    /// The series is not being tracked.
    #[error("series {0} is not tracked")]
    NotTracked(SeriesId),

    /// The id is malformed or unknown to the provider.
    #[error("invalid series id: {0}")]
    InvalidId(String),

    /// The provider could not be reached to validate the id.
    #[error("provider error: {0}")]
    Provider(#[from] GatewayError),

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] PersistenceError),
}

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// A tracked series with its current display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesListing {
    pub id: SeriesId,
    pub display_name: String,
}

/// Detail view for one tracked series.
#[derive(Debug, Clone)]
pub struct SeriesDetail {
    pub id: SeriesId,
    pub display_name: String,
    pub latest: Option<Episode>,
}

/// Display name used when the provider lookup fails.
pub fn fallback_name(id: &SeriesId) -> String {
    format!("Unknown series ({})", id)
}

/// Add/remove/list access to the tracked series set.
pub struct SeriesDirectory {
    store: Arc<dyn SeriesStore>,
    gateway: Arc<dyn MetadataGateway>,
    resolver: EpisodeResolver,
    locks: KeyedLocks<SeriesId>,
}

impl SeriesDirectory {
    pub fn new(store: Arc<dyn SeriesStore>, gateway: Arc<dyn MetadataGateway>) -> Self {
        let resolver = EpisodeResolver::new(Arc::clone(&gateway));
        Self {
            store,
            gateway,
            resolver,
            locks: KeyedLocks::new(),
        }
    }

    /// All tracked series with display names, ordered by id.
    pub async fn list_series(&self) -> Result<Vec<SeriesListing>> {
        let tracked = self.store.list_tracked().await?;
        let lookups = tracked.iter().map(|s| self.display_name(&s.id));
        let names = join_all(lookups).await;

        Ok(tracked
            .into_iter()
            .zip(names)
            .map(|(s, display_name)| SeriesListing {
                id: s.id,
                display_name,
            })
            .collect())
    }

    /// Start tracking a series. Returns its display name.
    pub async fn add_series(&self, id: &SeriesId) -> Result<String> {
        if !id.is_well_formed() {
            return Err(DirectoryError::InvalidId(id.to_string()));
        }

        // Membership check, provider validation and insert must not interleave per id
        let _guard = self.locks.lock(id.clone()).await;

        if self.store.is_tracked(id).await? {
            debug!(series_id = %id, "Series already tracked");
            return Err(DirectoryError::AlreadyTracked(id.clone()));
        }

        let info = match self.gateway.series(id).await {
            Ok(info) => info,
            Err(GatewayError::NotFound(_)) => {
                debug!(series_id = %id, "Provider does not know series");
                return Err(DirectoryError::InvalidId(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        match self.store.insert(TrackedSeries::new(id.clone())).await {
            Ok(()) => {}
            Err(PersistenceError::AlreadyExists { .. }) => {
                return Err(DirectoryError::AlreadyTracked(id.clone()))
            }
            Err(e) => return Err(e.into()),
        }

        info!(series_id = %id, name = %info.display_name, "Series added");
        Ok(info.display_name)
    }

    /// Stop tracking a series.
    pub async fn remove_series(&self, id: &SeriesId) -> Result<()> {
        let _guard = self.locks.lock(id.clone()).await;

        if !self.store.delete(id).await? {
            debug!(series_id = %id, "Series not tracked");
            return Err(DirectoryError::NotTracked(id.clone()));
        }

        info!(series_id = %id, "Series removed");
        Ok(())
    }

    /// Name and latest episode of a tracked series.
    pub async fn series_detail(&self, id: &SeriesId) -> Result<SeriesDetail> {
        if !self.store.is_tracked(id).await? {
            return Err(DirectoryError::NotTracked(id.clone()));
        }

        let (display_name, latest) =
            futures::join!(self.display_name(id), self.resolver.resolve_latest(id));

        Ok(SeriesDetail {
            id: id.clone(),
            display_name,
            latest,
        })
    }

    /// Provider display name, or the fallback placeholder.
    pub async fn display_name(&self, id: &SeriesId) -> String {
        match self.gateway.series(id).await {
            Ok(info) => info.display_name,
            Err(e) => {
                warn!(series_id = %id, error = %e, "Failed to resolve series name");
                fallback_name(id)
            }
        }
    }
}
