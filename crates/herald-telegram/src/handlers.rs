//! Command and callback handlers for the Telegram bot.

use std::sync::Arc;

use herald_core::{escape_html, DeliveredMessage, DirectoryError, ReactionChange};
use herald_models::{SeriesId, UserId};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::callback::CallbackAction;
use crate::keyboards::{
    series_detail_keyboard, series_detail_text, series_list_keyboard, series_list_text,
};
use crate::state::HeraldState;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and get help")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Track a series: /add_series <id>")]
    AddSeries(String),

    #[command(description = "Stop tracking a series: /remove_series <id>")]
    RemoveSeries(String),

    #[command(description = "Send the latest episode of a series: /latest_episode <id>")]
    LatestEpisode(String),

    #[command(description = "List tracked series")]
    ListSeries,
}

/// Reply for `/add_series`.
pub fn add_series_reply(id: &SeriesId, result: &Result<String, DirectoryError>) -> String {
    match result {
        Ok(name) => format!(
            "✅ Now tracking <b>{}</b> (<code>{}</code>).",
            escape_html(name),
            escape_html(id.as_str())
        ),
        Err(DirectoryError::AlreadyTracked(_)) => format!(
            "<code>{}</code> is already being tracked.",
            escape_html(id.as_str())
        ),
        Err(DirectoryError::InvalidId(_)) => format!(
            "<code>{}</code> is not a valid series id.\n\n<b>Usage:</b> <code>/add_series &lt;id&gt;</code>",
            escape_html(id.as_str())
        ),
        Err(_) => GENERIC_FAILURE.to_string(),
    }
}

/// Reply for `/remove_series` and the Remove button.
pub fn remove_series_reply(id: &SeriesId, result: &Result<(), DirectoryError>) -> String {
    match result {
        Ok(()) => format!("🗑 Stopped tracking <code>{}</code>.", escape_html(id.as_str())),
        Err(DirectoryError::NotTracked(_)) => format!(
            "<code>{}</code> is not being tracked.",
            escape_html(id.as_str())
        ),
        Err(_) => GENERIC_FAILURE.to_string(),
    }
}

fn log_directory_error(id: &SeriesId, e: &DirectoryError) {
    match e {
        DirectoryError::AlreadyTracked(_)
        | DirectoryError::NotTracked(_)
        | DirectoryError::InvalidId(_) => debug!(series_id = %id, reason = %e, "Directory request refused"),
        DirectoryError::Provider(_) | DirectoryError::Store(_) => {
            error!(series_id = %id, error = %e, "Directory request failed")
        }
    }
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    let welcome = "Welcome to Episode Herald! 📺\n\n\
        I watch your favourite series and post new episodes here as soon as they air.\n\n\
        <b>Getting Started:</b>\n\
        1. Use /add_series &lt;id&gt; with a TMDB series id\n\
        2. Use /list_series to see what is tracked\n\
        3. React to announcements with 👍 ❤️ 😡\n\n\
        Type /help for all commands.";

    bot.send_message(msg.chat.id, welcome)
        .parse_mode(ParseMode::Html)
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = Command::descriptions().to_string();
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

pub async fn handle_add_series(
    bot: Bot,
    msg: Message,
    state: Arc<HeraldState>,
    arg: String,
) -> ResponseResult<()> {
    let id = SeriesId::new(arg.trim());
    let result = state.add_series(&id).await;
    if let Err(e) = &result {
        log_directory_error(&id, e);
    }

    bot.send_message(msg.chat.id, add_series_reply(&id, &result))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub async fn handle_remove_series(
    bot: Bot,
    msg: Message,
    state: Arc<HeraldState>,
    arg: String,
) -> ResponseResult<()> {
    let id = SeriesId::new(arg.trim());
    let result = state.remove_series(&id).await;
    if let Err(e) = &result {
        log_directory_error(&id, e);
    }

    bot.send_message(msg.chat.id, remove_series_reply(&id, &result))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle /latest_episode - send the latest episode as a photo with reactions.
pub async fn handle_latest_episode(
    bot: Bot,
    msg: Message,
    state: Arc<HeraldState>,
    arg: String,
) -> ResponseResult<()> {
    let id = SeriesId::new(arg.trim());
    if !id.is_well_formed() {
        bot.send_message(
            msg.chat.id,
            "Please provide a series id.\n\n<b>Usage:</b> <code>/latest_episode &lt;id&gt;</code>",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    match state.announce_latest(msg.chat.id.0, &id).await {
        Ok(Some(episode)) => {
            debug!(series_id = %id, episode_id = %episode.id, "Latest episode sent");
        }
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "No aired episode found for <code>{}</code>.",
                    escape_html(id.as_str())
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => {
            warn!(series_id = %id, error = %e, "Failed to send latest episode");
            bot.send_message(msg.chat.id, GENERIC_FAILURE).await?;
        }
    }

    Ok(())
}

pub async fn handle_list_series(
    bot: Bot,
    msg: Message,
    state: Arc<HeraldState>,
) -> ResponseResult<()> {
    match state.list_series().await {
        Ok(listings) => {
            bot.send_message(msg.chat.id, series_list_text(&listings))
                .parse_mode(ParseMode::Html)
                .reply_markup(series_list_keyboard(&listings))
                .await?;
        }
        Err(e) => {
            error!(chat_id = %msg.chat.id, error = %e, "Failed to list series");
            bot.send_message(msg.chat.id, GENERIC_FAILURE).await?;
        }
    }
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<HeraldState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::AddSeries(id) => handle_add_series(bot, msg, state, id).await,
        Command::RemoveSeries(id) => handle_remove_series(bot, msg, state, id).await,
        Command::LatestEpisode(id) => handle_latest_episode(bot, msg, state, id).await,
        Command::ListSeries => handle_list_series(bot, msg, state).await,
    }
}

/// Handle an inline button tap. Every tap is acknowledged with a toast.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<HeraldState>,
) -> ResponseResult<()> {
    let origin = q.message.as_ref().map(|m| (m.chat().id, m.id()));
    let action = q.data.as_deref().and_then(CallbackAction::parse);

    debug!(user_id = q.from.id.0, data = ?q.data, "Callback received");

    let toast = match (action, origin) {
        (None, _) => {
            warn!(data = ?q.data, "Unknown callback data");
            "Unknown action".to_string()
        }
        (Some(CallbackAction::React { reaction, episode_id }), origin) => {
            let message = origin.map(|(chat, id)| DeliveredMessage {
                chat_id: chat.0,
                message_id: id.0,
            });
            match state
                .react(message, &episode_id, UserId(q.from.id.0), reaction)
                .await
            {
                Ok(applied) => match applied.change {
                    ReactionChange::Unchanged => format!("You already reacted {}", reaction.emoji()),
                    _ => format!("You reacted {}", reaction.emoji()),
                },
                Err(e) => {
                    error!(episode_id = %episode_id, error = %e, "Failed to apply reaction");
                    GENERIC_FAILURE.to_string()
                }
            }
        }
        (Some(_), None) => "This message is no longer available".to_string(),
        (Some(CallbackAction::ShowSeries(id)), Some((chat, message_id))) => {
            match state.series_detail(&id).await {
                Ok(detail) => {
                    let sent = bot
                        .edit_message_text(chat, message_id, series_detail_text(&detail))
                        .parse_mode(ParseMode::Html)
                        .reply_markup(series_detail_keyboard(&id))
                        .await;
                    delivered_toast(sent, detail.display_name)
                }
                Err(e) => {
                    log_directory_error(&id, &e);
                    match e {
                        DirectoryError::NotTracked(_) => "That series is no longer tracked".to_string(),
                        _ => GENERIC_FAILURE.to_string(),
                    }
                }
            }
        }
        (Some(CallbackAction::RemoveSeries(id)), Some((chat, _))) => {
            let result = state.remove_series(&id).await;
            if let Err(e) = &result {
                log_directory_error(&id, e);
            }
            if let Err(e) = bot
                .send_message(chat, remove_series_reply(&id, &result))
                .parse_mode(ParseMode::Html)
                .await
            {
                warn!(series_id = %id, error = %e, "Failed to send removal reply");
            }
            match result {
                Ok(()) => "Removed".to_string(),
                Err(_) => "Not removed".to_string(),
            }
        }
        (Some(CallbackAction::BackToList), Some((chat, message_id))) => {
            match state.list_series().await {
                Ok(listings) => {
                    let sent = bot
                        .edit_message_text(chat, message_id, series_list_text(&listings))
                        .parse_mode(ParseMode::Html)
                        .reply_markup(series_list_keyboard(&listings))
                        .await;
                    delivered_toast(sent, "Tracked series".to_string())
                }
                Err(e) => {
                    error!(error = %e, "Failed to list series");
                    GENERIC_FAILURE.to_string()
                }
            }
        }
    };

    bot.answer_callback_query(q.id.clone()).text(toast).await?;
    Ok(())
}

/// Toast for a callback whose visible effect is an edit of the menu message.
fn delivered_toast<T, E: std::fmt::Display>(sent: Result<T, E>, done: String) -> String {
    match sent {
        Ok(_) => done,
        Err(e) => {
            warn!(error = %e, "Failed to update menu message");
            GENERIC_FAILURE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::GatewayError;

    #[test]
    fn test_commands_parse() {
        let cmd = Command::parse("/add_series 1399", "herald_bot").unwrap();
        assert!(matches!(cmd, Command::AddSeries(id) if id == "1399"));

        let cmd = Command::parse("/latest_episode 95396", "herald_bot").unwrap();
        assert!(matches!(cmd, Command::LatestEpisode(id) if id == "95396"));

        let cmd = Command::parse("/list_series", "herald_bot").unwrap();
        assert!(matches!(cmd, Command::ListSeries));
    }

    #[test]
    fn test_add_series_replies() {
        let id = SeriesId::new("1399");

        let ok = add_series_reply(&id, &Ok("Game of Thrones".to_string()));
        assert!(ok.contains("Now tracking <b>Game of Thrones</b>"));

        let dup = add_series_reply(&id, &Err(DirectoryError::AlreadyTracked(id.clone())));
        assert!(dup.contains("already being tracked"));

        let bad = add_series_reply(&id, &Err(DirectoryError::InvalidId("1399".to_string())));
        assert!(bad.contains("not a valid series id"));

        let failed = add_series_reply(
            &id,
            &Err(DirectoryError::Provider(GatewayError::Http("timeout".to_string()))),
        );
        assert_eq!(failed, GENERIC_FAILURE);
    }

    #[test]
    fn test_remove_series_replies() {
        let id = SeriesId::new("<b>");

        let ok = remove_series_reply(&id, &Ok(()));
        assert!(ok.contains("&lt;b&gt;"));

        let missing = remove_series_reply(&id, &Err(DirectoryError::NotTracked(id.clone())));
        assert!(missing.contains("is not being tracked"));
    }

    #[test]
    fn test_failed_menu_edit_still_yields_toast() {
        let done = delivered_toast(Ok::<(), String>(()), "Game of Thrones".to_string());
        assert_eq!(done, "Game of Thrones");

        let failed = delivered_toast(
            Err::<(), _>("Bad Request: message is not modified".to_string()),
            "Game of Thrones".to_string(),
        );
        assert_eq!(failed, GENERIC_FAILURE);
    }
}
