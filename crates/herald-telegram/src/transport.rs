//! Telegram implementation of the chat transport.

use async_trait::async_trait;
use herald_core::{ChatTransport, DeliveredMessage, DispatchError, EpisodeNotification};
use herald_models::{EpisodeId, ReactionTally};
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ParseMode};
use tracing::debug;
use url::Url;

use crate::keyboards::reaction_keyboard;

/// Sends announcements as photo messages with a reaction row.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_episode(
        &self,
        chat_id: i64,
        notification: &EpisodeNotification,
    ) -> Result<DeliveredMessage, DispatchError> {
        let photo = Url::parse(&notification.photo_url)
            .map_err(|e| DispatchError(format!("invalid photo url {}: {}", notification.photo_url, e)))?;

        let sent = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::url(photo))
            .caption(notification.caption())
            .parse_mode(ParseMode::Html)
            .reply_markup(reaction_keyboard(&notification.episode.id, &notification.tally))
            .await
            .map_err(|e| DispatchError(e.to_string()))?;

        debug!(chat_id, message_id = sent.id.0, "Photo sent");
        Ok(DeliveredMessage {
            chat_id,
            message_id: sent.id.0,
        })
    }

    async fn refresh_reactions(
        &self,
        message: DeliveredMessage,
        episode_id: &EpisodeId,
        tally: &ReactionTally,
    ) -> Result<(), DispatchError> {
        self.bot
            .edit_message_reply_markup(ChatId(message.chat_id), MessageId(message.message_id))
            .reply_markup(reaction_keyboard(episode_id, tally))
            .await
            .map_err(|e| DispatchError(e.to_string()))?;
        Ok(())
    }
}
