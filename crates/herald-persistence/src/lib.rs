//! Persistence layer for Episode Herald.
//!
//! Two independent record sets are kept, each in its own JSON file that is
//! rewritten atomically (write to temp file, then rename) on every mutation:
//!
//! - tracked series, keyed by series id ([`JsonSeriesStore`])
//! - reactions, keyed by episode id + user id ([`JsonReactionStore`])
//!
//! Callers depend on the [`SeriesStore`] and [`ReactionStore`] traits so the
//! file backends can be swapped out.
//!
//! # Example
//!
//! ```no_run
//! use herald_persistence::{JsonSeriesStore, SeriesStore};
//! use herald_models::TrackedSeries;
//!
//! # async fn demo() -> herald_persistence::Result<()> {
//! let store = JsonSeriesStore::open("/home/user/.episode-herald/state/series.json").await?;
//! store.insert(TrackedSeries::new("1399")).await?;
//! assert!(store.is_tracked(&"1399".into()).await?);
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod error;
pub mod reaction_store;
pub mod series_store;

pub use error::{PersistenceError, Result};
pub use reaction_store::{JsonReactionStore, ReactionStore};
pub use series_store::{JsonSeriesStore, SeriesStore};
