use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use acb_core::{
    config::Config, messaging::port::MessagingPort, pipeline::SubmissionPipeline,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Long-polling loop: build the dispatcher and run until shutdown.
pub async fn run_polling(cfg: Arc<Config>, pipeline: Arc<SubmissionPipeline>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = me.username(), "bot started");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let state = Arc::new(AppState {
        pipeline,
        messenger,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
