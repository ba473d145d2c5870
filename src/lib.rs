pub mod bot;
pub mod core;
pub mod providers;
pub mod telegram;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

pub async fn run(config: &AppConfig) -> Result<()> {
    info!("Currency converter bot starting...");
    debug!("Loaded config: {config:#?}");

    let telegram = Arc::new(telegram::TelegramClient::new(
        &config.telegram_api_url,
        config.token(),
        config.poll_timeout_secs,
    )?);
    let rates = Arc::new(providers::FloatRatesProvider::new(&config.rates_base_url)?);

    let mut bot = bot::Bot::new(telegram, rates);
    bot.start().await?;
    info!("Currency converter bot is running");

    bot.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    })
    .await
}
