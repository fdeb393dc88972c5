//! Scheduler configuration.

use std::time::Duration;

use herald_core::config::DEFAULT_POLL_INTERVAL;

/// Configuration for the notification scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often tracked series are checked.
    pub interval: Duration,
    /// Chat that receives announcements.
    pub chat_id: i64,
    /// Seed the watermark from, and write it through to, the series store.
    pub persist_watermark: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            chat_id: 0,
            persist_watermark: true,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the announcement chat.
    pub fn with_chat_id(mut self, chat_id: i64) -> Self {
        self.chat_id = chat_id;
        self
    }

    /// Enables or disables the persisted watermark.
    pub fn with_persist_watermark(mut self, persist: bool) -> Self {
        self.persist_watermark = persist;
        self
    }
}

impl From<&herald_core::Settings> for SchedulerConfig {
    fn from(settings: &herald_core::Settings) -> Self {
        Self {
            interval: settings.poll_interval,
            chat_id: settings.chat_id,
            persist_watermark: settings.persist_watermark,
        }
    }
}
