//! Scheduling runtime for Episode Herald.
//!
//! - [`Scheduler`] checks every tracked series on a fixed cadence and
//!   announces episodes it has not announced before
//! - [`Watermark`] remembers the last announced episode per series
//! - [`InFlight`] keeps overlapping ticks from checking the same series twice
//! - [`Runtime`] runs the scheduler as a background task with graceful shutdown
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use herald_runtime::{Runtime, Scheduler, SchedulerConfig};
//!
//! let scheduler = Arc::new(Scheduler::new(
//!     SchedulerConfig::new().with_chat_id(chat_id),
//!     series_store,
//!     gateway,
//!     tally,
//!     renderer,
//!     transport,
//! ));
//! let mut runtime = Runtime::new(scheduler);
//! runtime.start().await?;
//! tokio::signal::ctrl_c().await?;
//! runtime.shutdown().await?;
//! ```

pub mod config;
pub mod error;
pub mod in_flight;
pub mod runtime;
pub mod scheduler;
pub mod watermark;

pub use config::SchedulerConfig;
pub use error::{Result, RuntimeError};
pub use in_flight::{InFlight, InFlightGuard};
pub use runtime::Runtime;
pub use scheduler::{CheckOutcome, Scheduler, TickReport};
pub use watermark::Watermark;
