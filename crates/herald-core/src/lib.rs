//! Episode Herald Core - shared business logic.
//!
//! - **config**: on-disk layout and environment settings
//! - **gateway**: the metadata provider abstraction
//! - **tmdb**: TMDB implementation of the gateway
//! - **resolver**: latest eligible episode of a series
//! - **tally**: reaction transitions and tallies
//! - **directory**: add/remove/list tracked series
//! - **notification**: announcement rendering and the chat transport trait
//! - **keyed_lock**: per-key async locks

pub mod config;
pub mod directory;
pub mod gateway;
pub mod keyed_lock;
pub mod notification;
pub mod resolver;
pub mod tally;
pub mod tmdb;

pub use config::{ConfigError, Settings};
pub use directory::{DirectoryError, SeriesDetail, SeriesDirectory, SeriesListing};
pub use gateway::{GatewayError, MetadataGateway};
pub use keyed_lock::{KeyedGuard, KeyedLocks};
pub use notification::{
    escape_html, ChatTransport, DeliveredMessage, DispatchError, EpisodeNotification,
    NotificationRenderer,
};
pub use resolver::EpisodeResolver;
pub use tally::{AppliedReaction, ReactionChange, TallyEngine};
pub use tmdb::TmdbClient;
