//! Shared configuration for Episode Herald.
//!
//! Provides the on-disk layout and the settings read from the environment.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.episode-herald/`:
//!
//! ```text
//! ~/.episode-herald/
//! ├── config/       # .env.local with tokens and settings
//! └── state/        # series.json, reactions.json
//! ```
//!
//! # Environment Variables
//!
//! - `HERALD_STATE_DIR`: Override the base directory
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather (required)
//! - `TMDB_API_KEY`: TMDB v3 API key (required)
//! - `HERALD_CHAT_ID`: Chat that receives new-episode announcements (required)
//! - `HERALD_POLL_INTERVAL_SECS`: Polling cadence in seconds (default 60)
//! - `HERALD_PERSIST_WATERMARK`: Remember announced episodes across restarts (default true)
//! - `TMDB_API_URL`: Provider API base (default `https://api.themoviedb.org/3/`)
//! - `TMDB_IMAGE_URL`: Image base for episode stills (default `https://image.tmdb.org/t/p/original`)

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

/// Environment variable for a custom base directory.
pub const STATE_DIR_ENV: &str = "HERALD_STATE_DIR";

pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";
pub const CHAT_ID_ENV: &str = "HERALD_CHAT_ID";
pub const POLL_INTERVAL_ENV: &str = "HERALD_POLL_INTERVAL_SECS";
pub const PERSIST_WATERMARK_ENV: &str = "HERALD_PERSIST_WATERMARK";
pub const TMDB_API_URL_ENV: &str = "TMDB_API_URL";
pub const TMDB_IMAGE_URL_ENV: &str = "TMDB_IMAGE_URL";

/// Default base directory name under home.
const DEFAULT_STATE_DIR: &str = ".episode-herald";

pub const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3/";
pub const DEFAULT_TMDB_IMAGE_URL: &str = "https://image.tmdb.org/t/p/original";

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

const CONFIG_SUBDIR: &str = "config";
const STATE_SUBDIR: &str = "state";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the Episode Herald base directory.
///
/// Determined by:
/// 1. `HERALD_STATE_DIR` environment variable if set
/// 2. `~/.episode-herald` if home directory is available
/// 3. `.episode-herald` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Directory holding `.env.local`.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Directory holding the store files.
pub fn runtime_state_dir() -> PathBuf {
    state_dir().join(STATE_SUBDIR)
}

/// Tracked series file.
pub fn series_file() -> PathBuf {
    runtime_state_dir().join("series.json")
}

/// Reaction records file.
pub fn reactions_file() -> PathBuf {
    runtime_state_dir().join("reactions.json")
}

/// Environment file for secrets.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Ensure the config and state directories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(runtime_state_dir())?;
    Ok(())
}

/// Load `.env` files: the config directory first, then the working directory.
///
/// Variables already set in the process environment win.
pub fn load_env_files() {
    let env_path = env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub telegram_token: String,
    pub tmdb_api_key: String,
    /// Chat that receives announcements.
    pub chat_id: i64,
    pub poll_interval: Duration,
    pub persist_watermark: bool,
    pub tmdb_api_url: String,
    pub tmdb_image_url: String,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let chat_raw = required(CHAT_ID_ENV)?;
        let chat_id = chat_raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: CHAT_ID_ENV,
            value: chat_raw.clone(),
        })?;

        let poll_interval = match lookup(POLL_INTERVAL_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: POLL_INTERVAL_ENV,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_POLL_INTERVAL,
        };

        let persist_watermark = match lookup(PERSIST_WATERMARK_ENV) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: PERSIST_WATERMARK_ENV,
                value: raw,
            })?,
            None => true,
        };

        Ok(Self {
            telegram_token: required(TELEGRAM_TOKEN_ENV)?,
            tmdb_api_key: required(TMDB_API_KEY_ENV)?,
            chat_id,
            poll_interval,
            persist_watermark,
            tmdb_api_url: lookup(TMDB_API_URL_ENV)
                .unwrap_or_else(|| DEFAULT_TMDB_API_URL.to_string()),
            tmdb_image_url: lookup(TMDB_IMAGE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_TMDB_IMAGE_URL.to_string()),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
