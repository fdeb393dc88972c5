//! Inline keyboards and the texts rendered alongside them.

use herald_core::{escape_html, SeriesDetail, SeriesListing};
use herald_models::{EpisodeId, Reaction, ReactionTally, SeriesId};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::callback::CallbackAction;

/// One row of `👍 n` `❤️ n` `😡 n` buttons for an episode.
pub fn reaction_keyboard(episode_id: &EpisodeId, tally: &ReactionTally) -> InlineKeyboardMarkup {
    let row = Reaction::ALL
        .iter()
        .map(|&reaction| {
            InlineKeyboardButton::callback(
                format!("{} {}", reaction.emoji(), tally.count(reaction)),
                CallbackAction::React {
                    reaction,
                    episode_id: episode_id.clone(),
                }
                .to_string(),
            )
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}

/// One button per tracked series.
pub fn series_list_keyboard(listings: &[SeriesListing]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(listings.iter().map(|listing| {
        vec![InlineKeyboardButton::callback(
            listing.display_name.clone(),
            CallbackAction::ShowSeries(listing.id.clone()).to_string(),
        )]
    }))
}

/// Remove and Back buttons under a series detail.
pub fn series_detail_keyboard(id: &SeriesId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "🗑 Remove",
            CallbackAction::RemoveSeries(id.clone()).to_string(),
        ),
        InlineKeyboardButton::callback("⬅️ Back", CallbackAction::BackToList.to_string()),
    ]])
}

pub fn series_list_text(listings: &[SeriesListing]) -> String {
    if listings.is_empty() {
        return "No series tracked yet.\n\nUse <code>/add_series &lt;id&gt;</code> to start."
            .to_string();
    }
    format!(
        "<b>Tracked series ({})</b>\n\nTap a series for details.",
        listings.len()
    )
}

pub fn series_detail_text(detail: &SeriesDetail) -> String {
    let latest = match &detail.latest {
        Some(episode) => format!(
            "{} · <i>{}</i>",
            episode.code(),
            escape_html(&episode.title)
        ),
        None => "No aired episode yet".to_string(),
    };

    format!(
        "📺 <b>{}</b>\nID: <code>{}</code>\n\nLatest: {}",
        escape_html(&detail.display_name),
        escape_html(detail.id.as_str()),
        latest
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("unexpected button kind: {:?}", other),
        }
    }

    #[test]
    fn test_reaction_keyboard_labels_and_data() {
        let tally = ReactionTally {
            like: 3,
            love: 0,
            angry: 1,
        };
        let keyboard = reaction_keyboard(&EpisodeId::new("63056"), &tally);

        assert_eq!(keyboard.inline_keyboard.len(), 1);
        let row = &keyboard.inline_keyboard[0];
        let labels: Vec<&str> = row.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["👍 3", "❤️ 0", "😡 1"]);
        let data: Vec<&str> = row.iter().map(callback_data).collect();
        assert_eq!(data, vec!["like_63056", "love_63056", "angry_63056"]);
    }

    #[test]
    fn test_series_list_keyboard() {
        let listings = vec![
            SeriesListing {
                id: "1399".into(),
                display_name: "Game of Thrones".to_string(),
            },
            SeriesListing {
                id: "95396".into(),
                display_name: "Severance".to_string(),
            },
        ];
        let keyboard = series_list_keyboard(&listings);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[1][0].text, "Severance");
        assert_eq!(callback_data(&keyboard.inline_keyboard[0][0]), "series_1399");
        assert!(series_list_text(&listings).contains("(2)"));
        assert!(series_list_text(&[]).contains("No series tracked"));
    }

    #[test]
    fn test_series_detail_keyboard() {
        let keyboard = series_detail_keyboard(&"1399".into());
        let data: Vec<&str> = keyboard.inline_keyboard[0].iter().map(callback_data).collect();
        assert_eq!(data, vec!["remove_1399", "back_to_list"]);
    }

    #[test]
    fn test_series_detail_text_without_episode() {
        let detail = SeriesDetail {
            id: "1399".into(),
            display_name: "Law & Order".to_string(),
            latest: None,
        };
        let text = series_detail_text(&detail);

        assert!(text.contains("Law &amp; Order"));
        assert!(text.contains("No aired episode yet"));
    }
}
