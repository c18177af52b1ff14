//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::dialogue::{load_session, BrowseDialogue};
use crate::localization::t_lang;
use crate::navigation::{Event, Navigator};
use crate::render::render_step;
use crate::search::SearchProvider;

use super::ui_builder::{present, Target};

/// What a text message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `/start` or `/help`
    Help,
    /// Plain text, `/g <query>` or `/search <query>`
    Search(String),
    /// Any other command
    Unknown(String),
}

/// Interpret the text of a message
pub fn parse_request(text: &str) -> Request {
    let trimmed = text.trim();
    let Some(command_line) = trimmed.strip_prefix('/') else {
        return Request::Search(trimmed.to_string());
    };

    let (command, argument) = command_line
        .split_once(char::is_whitespace)
        .unwrap_or((command_line, ""));
    // Commands may be addressed as /g@SomeBot in group chats
    let command = command.split('@').next().unwrap_or_default().to_lowercase();

    match command.as_str() {
        "start" | "help" => Request::Help,
        "g" | "search" => Request::Search(argument.trim().to_string()),
        _ => Request::Unknown(command),
    }
}

async fn handle_text_message<P: SearchProvider>(
    bot: &Bot,
    msg: &Message,
    text: &str,
    dialogue: BrowseDialogue,
    navigator: &Navigator<P>,
    config: &BotConfig,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    let query = match parse_request(text) {
        Request::Search(query) => query,
        Request::Help => {
            bot.send_message(msg.chat.id, t_lang("help", language_code))
                .await?;
            return Ok(());
        }
        Request::Unknown(command) => {
            debug!(user_id = %msg.chat.id, command = %command, "Unknown command");
            bot.send_message(msg.chat.id, t_lang("help", language_code))
                .await?;
            return Ok(());
        }
    };

    if !query.trim().is_empty() {
        if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
            debug!(user_id = %msg.chat.id, error = %e, "Failed to send typing indicator");
        }
    }

    let step = navigator.step(Event::SubmitQuery(query)).await;
    let view = render_step(&step, navigator.render_settings(), language_code);

    let mut session = load_session(&dialogue, config.payload_cache_size).await?;
    present(bot, Target::New(msg.chat.id), &view, &mut session).await?;
    dialogue.update(session).await?;

    info!(user_id = %msg.chat.id, "Search screen sent");
    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");

    bot.send_message(msg.chat.id, t_lang("unsupported-message", language_code))
        .await?;
    Ok(())
}

pub async fn message_handler<P: SearchProvider + 'static>(
    bot: Bot,
    msg: Message,
    dialogue: BrowseDialogue,
    navigator: Arc<Navigator<P>>,
    config: Arc<BotConfig>,
) -> Result<()> {
    match msg.text() {
        Some(text) => handle_text_message(&bot, &msg, text, dialogue, &navigator, &config).await?,
        None => handle_unsupported_message(&bot, &msg).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_search() {
        assert_eq!(
            parse_request("  Inception  "),
            Request::Search("Inception".to_string())
        );
    }

    #[test]
    fn test_search_commands() {
        assert_eq!(
            parse_request("/g The Matrix"),
            Request::Search("The Matrix".to_string())
        );
        assert_eq!(
            parse_request("/search@WatchBot  Heat "),
            Request::Search("Heat".to_string())
        );
        assert_eq!(parse_request("/g"), Request::Search(String::new()));
    }

    #[test]
    fn test_help_and_unknown_commands() {
        assert_eq!(parse_request("/start"), Request::Help);
        assert_eq!(parse_request("/HELP"), Request::Help);
        assert_eq!(
            parse_request("/settings now"),
            Request::Unknown("settings".to_string())
        );
    }
}
