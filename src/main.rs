use anyhow::Result;
use std::env;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use justwatch_bot::bot::{callback_handler, message_handler};
use justwatch_bot::config::BotConfig;
use justwatch_bot::dialogue::BrowseSession;
use justwatch_bot::localization::init_localization;
use justwatch_bot::navigation::Navigator;
use justwatch_bot::search::HttpSearchProvider;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("justwatch_bot=info,teloxide=warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting JustWatch Telegram Bot");

    init_localization()?;

    let config = Arc::new(BotConfig::from_env()?);
    info!(
        country = %config.search.country,
        language = %config.search.language,
        count = config.search.count,
        allowed_users = config.allowed_usernames.len(),
        "Configuration loaded"
    );

    let provider = HttpSearchProvider::new(config.search.clone());
    let navigator = Arc::new(Navigator::new(provider, config.render.clone()));

    // Initialize the bot
    let bot = Bot::new(config.token.clone());

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter(|msg: Message, config: Arc<BotConfig>| {
                    config.is_allowed(msg.from.as_ref().and_then(|user| user.username.as_deref()))
                })
                .enter_dialogue::<Message, InMemStorage<BrowseSession>, BrowseSession>()
                .endpoint(message_handler::<HttpSearchProvider>),
        )
        .branch(
            Update::filter_callback_query()
                .filter(|q: CallbackQuery, config: Arc<BotConfig>| {
                    config.is_allowed(q.from.username.as_deref())
                })
                .enter_dialogue::<CallbackQuery, InMemStorage<BrowseSession>, BrowseSession>()
                .endpoint(callback_handler::<HttpSearchProvider>),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            InMemStorage::<BrowseSession>::new(),
            navigator,
            config
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
