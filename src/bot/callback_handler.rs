//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, warn};

use crate::config::BotConfig;
use crate::dialogue::{load_session, BrowseDialogue, BrowseSession};
use crate::navigation::{Event, Navigator};
use crate::render::render_step;
use crate::search::SearchProvider;

use super::ui_builder::{present, Target};

/// Turn callback data into a navigation event
pub fn resolve_event(session: &BrowseSession, data: Option<&str>) -> Event {
    match data.map(|data| session.decode(data)) {
        Some(Ok(payload)) => Event::Press(payload),
        Some(Err(e)) => {
            warn!(error = %e, "Callback payload expired");
            Event::Stale
        }
        None => {
            warn!("Callback query without data");
            Event::Stale
        }
    }
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler<P: SearchProvider + 'static>(
    bot: Bot,
    q: CallbackQuery,
    dialogue: BrowseDialogue,
    navigator: Arc<Navigator<P>>,
    config: Arc<BotConfig>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    // Answer the callback query to remove the loading state; old queries are rejected by Telegram
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let Some(message) = &q.message else {
        debug!(user_id = %q.from.id, "Callback query without message, ignoring");
        return Ok(());
    };

    let language_code = q.from.language_code.as_deref();
    let mut session = load_session(&dialogue, config.payload_cache_size).await?;

    let event = resolve_event(&session, q.data.as_deref());
    let step = navigator.step(event).await;
    let view = render_step(&step, navigator.render_settings(), language_code);

    let target = Target::Edit {
        chat_id: message.chat().id,
        message_id: message.id(),
        has_photo: message
            .regular_message()
            .is_some_and(|msg| msg.photo().is_some()),
    };
    present(&bot, target, &view, &mut session).await?;
    dialogue.update(session).await?;

    Ok(())
}
