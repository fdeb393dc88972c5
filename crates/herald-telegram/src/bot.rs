//! Main Telegram bot implementation.

use std::sync::Arc;

use herald_core::Settings;
use herald_runtime::Runtime;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{info, warn};

use crate::error::{Result, TelegramError};
use crate::handlers::{handle_callback, handle_command, Command};
use crate::state::HeraldState;
use crate::transport::TelegramTransport;

/// The Episode Herald bot: command handlers plus the background scheduler.
pub struct HeraldBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<HeraldState>,
}

impl HeraldBot {
    /// Create the bot and open its state from `settings`.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let bot = Bot::new(settings.telegram_token.clone());
        let transport = Arc::new(TelegramTransport::new(bot.clone()));
        let state = Arc::new(HeraldState::open(settings, transport).await?);

        Ok(Self { bot, state })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Start the scheduler and serve updates in polling mode until Ctrl+C.
    pub async fn run(&self) -> Result<()> {
        let mut runtime = Runtime::new(self.state.scheduler());
        runtime.start().await?;

        let state_for_commands = Arc::clone(&self.state);
        let state_for_callbacks = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let state = Arc::clone(&state_for_callbacks);
                    async move { handle_callback(bot, q, state).await }
                }),
            )
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Commands that didn't parse still get a reply
                        msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(|bot: Bot, msg: Message| async move {
                        if let Some(text) = msg.text() {
                            info!(cmd = %text, "Unrecognized command");
                            let name = text.split_whitespace().next().unwrap_or(text);
                            bot.send_message(
                                msg.chat.id,
                                format!("Unknown command: {}\n\nUse /help to see available commands.", name),
                            )
                            .await?;
                        }
                        Ok(())
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        runtime.shutdown().await?;
        Ok(())
    }
}
