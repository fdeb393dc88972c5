//! Episode announcements and the chat transport they go through.
//!
//! The detection loop and the reaction handlers only know the
//! [`ChatTransport`] trait; the Telegram crate provides the implementation.

use async_trait::async_trait;
use herald_models::{Episode, EpisodeId, ReactionTally};
use thiserror::Error;

/// Telegram rejects photo captions longer than this.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// The chat transport rejected or failed a send/edit.
#[derive(Debug, Error)]
#[error("dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// A message that was delivered and can be edited later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Everything needed to render one episode announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeNotification {
    pub series_name: String,
    pub episode: Episode,
    pub photo_url: String,
    pub tally: ReactionTally,
}

impl EpisodeNotification {
    /// HTML caption: heading, episode code and title, then the synopsis.
    ///
    /// The synopsis is shortened so the caption fits Telegram's limit.
    pub fn caption(&self) -> String {
        let heading = format!(
            "📺 <b>New episode of {}</b>\n{} · <i>{}</i>\n\n",
            escape_html(&self.series_name),
            self.episode.code(),
            escape_html(&self.episode.title),
        );

        let budget = MAX_CAPTION_CHARS.saturating_sub(heading.chars().count());
        let synopsis = truncate_chars(&self.episode.synopsis, budget);
        format!("{}{}", heading, escape_html(&synopsis))
    }
}

/// Builds announcements from resolved episodes.
#[derive(Debug, Clone)]
pub struct NotificationRenderer {
    image_base: String,
}

impl NotificationRenderer {
    /// `image_base` is prefixed to the provider's thumbnail reference.
    pub fn new(image_base: impl Into<String>) -> Self {
        Self {
            image_base: image_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn render(
        &self,
        series_name: impl Into<String>,
        episode: Episode,
        tally: ReactionTally,
    ) -> EpisodeNotification {
        let photo_url = self.photo_url(&episode.thumbnail_ref);
        EpisodeNotification {
            series_name: series_name.into(),
            episode,
            photo_url,
            tally,
        }
    }

    fn photo_url(&self, thumbnail_ref: &str) -> String {
        if thumbnail_ref.starts_with("http://") || thumbnail_ref.starts_with("https://") {
            return thumbnail_ref.to_string();
        }
        format!("{}/{}", self.image_base, thumbnail_ref.trim_start_matches('/'))
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a photo announcement with a reaction row.
    async fn send_episode(
        &self,
        chat_id: i64,
        notification: &EpisodeNotification,
    ) -> Result<DeliveredMessage, DispatchError>;

    /// Re-render the reaction row of an earlier announcement with new counts.
    async fn refresh_reactions(
        &self,
        message: DeliveredMessage,
        episode_id: &EpisodeId,
        tally: &ReactionTally,
    ) -> Result<(), DispatchError>;
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(1);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push('…');
    cut
}
