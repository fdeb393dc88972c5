//! Core data models for Episode Herald.
//!
//! This crate provides the fundamental data types shared by the stores, the
//! detection loop and the chat front-end: identifiers, provider episodes,
//! tracked series and reaction records.

pub mod episode;
pub mod ids;
pub mod reaction;
pub mod series;

// Re-export main types
pub use episode::{Episode, SeasonEpisode};
pub use ids::{EpisodeId, SeriesId, UserId};
pub use reaction::{Reaction, ReactionRecord, ReactionTally};
pub use series::{SeriesInfo, SeriesSummary, TrackedSeries};
