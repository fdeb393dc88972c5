//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Required settings missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] herald_core::ConfigError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Metadata provider client could not be built.
    #[error("Provider error: {0}")]
    Provider(#[from] herald_core::GatewayError),

    /// Series or reaction store error.
    #[error("Store error: {0}")]
    Store(#[from] herald_persistence::PersistenceError),

    /// Scheduler runtime error.
    #[error("Runtime error: {0}")]
    Runtime(#[from] herald_runtime::RuntimeError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
