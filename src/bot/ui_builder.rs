//! UI Builder module for turning views into Telegram messages

use anyhow::Result;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto, MessageId,
    ParseMode,
};
use tracing::{debug, error, warn};

use crate::dialogue::BrowseSession;
use crate::render::{Button, ButtonAction, View};

/// Where a view is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Send a new message
    New(ChatId),
    /// Replace the content of the message the pressed button belongs to
    Edit {
        chat_id: ChatId,
        message_id: MessageId,
        has_photo: bool,
    },
}

/// Create the inline keyboard of a view, storing oversized payloads in the session
pub fn build_keyboard(view: &View, session: &mut BrowseSession) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = view
        .keyboard
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|button| to_inline_button(button, session))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    InlineKeyboardMarkup::new(rows)
}

fn to_inline_button(button: &Button, session: &mut BrowseSession) -> Option<InlineKeyboardButton> {
    match &button.action {
        ButtonAction::Callback(payload) => Some(InlineKeyboardButton::callback(
            button.label.clone(),
            session.encode(payload.clone()),
        )),
        ButtonAction::Url(url) => Url::parse(url)
            .ok()
            .map(|url| InlineKeyboardButton::url(button.label.clone(), url)),
    }
}

/// Show a view: send it as a new message or edit an existing one.
///
/// Editing failures are logged and swallowed so a single stale message never
/// aborts the update.
pub async fn present(
    bot: &Bot,
    target: Target,
    view: &View,
    session: &mut BrowseSession,
) -> Result<()> {
    let keyboard = build_keyboard(view, session);
    let image = view.image.as_deref().and_then(|url| Url::parse(url).ok());

    match target {
        Target::New(chat_id) => {
            let sent_photo = match image {
                Some(url) => match bot
                    .send_photo(chat_id, InputFile::url(url))
                    .caption(view.text.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard.clone())
                    .await
                {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(user_id = %chat_id, error = %e, "Failed to send photo, sending text only");
                        false
                    }
                },
                None => false,
            };
            if !sent_photo {
                bot.send_message(chat_id, view.text.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?;
            }
            debug!(user_id = %chat_id, "Sent new screen");
        }
        Target::Edit {
            chat_id,
            message_id,
            has_photo: true,
        } => {
            if let Some(url) = image {
                let media = InputMediaPhoto::new(InputFile::url(url))
                    .caption(view.text.clone())
                    .parse_mode(ParseMode::Html);
                match bot
                    .edit_message_media(chat_id, message_id, InputMedia::Photo(media))
                    .reply_markup(keyboard.clone())
                    .await
                {
                    Ok(_) => return Ok(()),
                    Err(e) => {
                        warn!(user_id = %chat_id, error = %e, "Failed to replace image, updating caption only")
                    }
                }
            }

            if let Err(e) = bot
                .edit_message_caption(chat_id, message_id)
                .caption(view.text.clone())
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await
            {
                error!(user_id = %chat_id, error = %e, "Failed to edit message caption");
            }
        }
        Target::Edit {
            chat_id,
            message_id,
            has_photo: false,
        } => {
            if let Err(e) = bot
                .edit_message_text(chat_id, message_id, view.text.clone())
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await
            {
                error!(user_id = %chat_id, error = %e, "Failed to edit message text");
            }
        }
    }

    Ok(())
}
