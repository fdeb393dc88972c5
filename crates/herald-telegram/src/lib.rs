//! Telegram bot interface for Episode Herald.
//!
//! Polls TMDB for newly aired episodes of tracked series, announces them as
//! photo messages with a reaction row, and lets users manage the tracked
//! series from chat.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `TMDB_API_KEY`: TMDB v3 API key
//! - `HERALD_CHAT_ID`: Chat that receives announcements
//!
//! Optional:
//! - `HERALD_POLL_INTERVAL_SECS`: Polling interval (default: 60)
//! - `HERALD_PERSIST_WATERMARK`: Remember announced episodes across restarts (default: true)
//! - `HERALD_STATE_DIR`: State directory (default: ~/.episode-herald)
//! - `TMDB_API_URL`, `TMDB_IMAGE_URL`: Provider endpoints
//!
//! # Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Show available commands
//! - `/add_series <id>` - Track a series
//! - `/remove_series <id>` - Stop tracking a series
//! - `/latest_episode <id>` - Send the latest episode of a series
//! - `/list_series` - List tracked series as buttons

pub mod bot;
pub mod callback;
pub mod error;
pub mod handlers;
pub mod keyboards;
pub mod state;
pub mod transport;

pub use bot::HeraldBot;
pub use callback::CallbackAction;
pub use error::{Result, TelegramError};
pub use state::HeraldState;
pub use transport::TelegramTransport;
