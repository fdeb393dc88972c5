//! Episode Herald binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx TMDB_API_KEY=yyy HERALD_CHAT_ID=-100123 cargo run -p herald-telegram
//! ```

use std::time::Duration;

use clap::Parser;
use herald_core::config;
use herald_core::Settings;
use herald_telegram::HeraldBot;
use tracing_subscriber::EnvFilter;

/// Episode Herald - new episode announcements for Telegram
#[derive(Parser, Debug)]
#[command(name = "episode-herald")]
#[command(about = "Telegram bot that announces newly aired episodes of tracked series")]
struct Args {
    /// Polling interval in seconds (overrides HERALD_POLL_INTERVAL_SECS)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Chat that receives announcements (overrides HERALD_CHAT_ID)
    #[arg(short, long, allow_hyphen_values = true)]
    chat_id: Option<i64>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    config::load_env_files();

    // RUST_LOG wins over -v
    let filter = match args.verbose {
        0 => "herald_telegram=info,herald_runtime=info,herald_core=info,teloxide=warn",
        1 => "herald_telegram=debug,herald_runtime=debug,herald_core=debug,herald_persistence=debug,teloxide=info",
        2 => "herald_telegram=trace,herald_runtime=trace,herald_core=trace,herald_persistence=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = config::ensure_all_dirs() {
        tracing::warn!(error = %e, "Failed to create all directories");
    }

    let mut settings = Settings::from_env()?;
    if let Some(secs) = args.interval {
        settings.poll_interval = Duration::from_secs(secs.max(1));
    }
    if let Some(chat_id) = args.chat_id {
        settings.chat_id = chat_id;
    }

    let bot = HeraldBot::new(&settings).await?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n📺 Episode Herald");
            println!("   Bot: @{}", username);
            println!("   Announcing to chat {}", settings.chat_id);
            println!("   Polling every {}s", settings.poll_interval.as_secs());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n   Press Ctrl+C to stop\n");

    bot.run().await?;

    Ok(())
}
