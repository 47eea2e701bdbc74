use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use survey_bot::answer_log::AnswerLog;
use survey_bot::bot::{self, SurveyFlow};
use survey_bot::config::{BotConfig, LogFormat};
use survey_bot::db;
use survey_bot::dialogue::{user_dialogue, SurveyState};
use survey_bot::localization::LocalizationManager;
use survey_bot::media_store::MediaStore;
use survey_bot::survey::SurveyCatalog;
use survey_bot::transport::TelegramTransport;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting Survey Telegram Bot");

    let catalog = SurveyCatalog::from_file(&config.survey_config_path)?;
    let l10n = LocalizationManager::new(&config.language)?;
    info!(language = l10n.language(), "Localization loaded");

    let media = MediaStore::new(&config.media_dir);
    media.ensure_dir().await?;
    let answer_log = AnswerLog::new(&config.answer_log_path);

    let bot = Bot::new(&config.bot_token);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));

    let mut flow = SurveyFlow::new(catalog, transport, media, answer_log, l10n, config.admin_id);

    if config.persist_responses {
        match &config.database_url {
            Some(database_url) => {
                let pool = db::connect(database_url).await?;
                db::init_database_schema(&pool)
                    .await
                    .context("Failed to prepare responses table")?;
                flow = flow.with_response_store(pool);
                info!("Completed surveys will be written to the responses table");
            }
            None => warn!("PERSIST_RESPONSES is set without DATABASE_URL, responses table disabled"),
        }
    }

    info!("Bot initialized, starting dispatcher");

    // Survey state is keyed by sender, not by chat
    let handler = Update::filter_message()
        .filter_map(|msg: Message, storage: Arc<InMemStorage<SurveyState>>| {
            msg.from.as_ref().map(|user| user_dialogue(storage, user.id))
        })
        .endpoint(bot::message_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<SurveyState>::new(), Arc::new(flow)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
