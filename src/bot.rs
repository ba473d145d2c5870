//! Dispatches inbound chat messages to the conversion logic.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::command::{BotCommand, ConversionRequest};
use crate::core::currency::{self, RateError, RateTableProvider};
use crate::core::reply;
use crate::telegram::{CommandDescription, TelegramClient, Update};

/// Pause before polling again after `getUpdates` failed.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Builds the reply for a message, or `None` when the bot should stay silent.
pub async fn reply_to(
    text: &str,
    bot_username: Option<&str>,
    rates: &dyn RateTableProvider,
) -> Option<String> {
    let reply = match BotCommand::route(text, bot_username)? {
        BotCommand::Help => reply::HELP_TEXT.to_string(),
        BotCommand::Convert => convert_reply(text, rates).await,
    };
    Some(reply)
}

async fn convert_reply(text: &str, rates: &dyn RateTableProvider) -> String {
    let Some(request) = ConversionRequest::parse(text) else {
        debug!(text, "Rejected malformed conversion command");
        return reply::INVALID_COMMAND.to_string();
    };

    match currency::convert(rates, &request).await {
        Ok(result) => {
            debug!(?result, "Converted amount");
            reply::conversion(&result)
        }
        Err(RateError::UnknownCurrency(code)) => {
            info!(%code, "Currency code not in rate table");
            reply::unknown_currency(&code)
        }
        Err(RateError::SourceUnavailable(reason)) => {
            error!(error = %reason, code = %request.target_code, "Failed to fetch rate table");
            reply::SOURCE_UNAVAILABLE.to_string()
        }
    }
}

#[derive(Clone)]
pub struct Bot {
    telegram: Arc<TelegramClient>,
    rates: Arc<dyn RateTableProvider>,
    username: Option<String>,
}

impl Bot {
    pub fn new(telegram: Arc<TelegramClient>, rates: Arc<dyn RateTableProvider>) -> Self {
        Bot {
            telegram,
            rates,
            username: None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Verifies the token and registers the command menu.
    pub async fn start(&mut self) -> Result<()> {
        let me = self
            .telegram
            .get_me()
            .await
            .context("Failed to authenticate with Telegram")?;
        info!(id = me.id, username = ?me.username, "Authenticated as bot");
        self.username = me.username;

        let commands = [CommandDescription {
            command: "help".to_string(),
            description: "Usage instructions".to_string(),
        }];
        if let Err(e) = self.telegram.set_my_commands(&commands).await {
            warn!(error = %e, "Failed to register bot commands");
        }

        Ok(())
    }

    pub async fn respond(&self, text: &str) -> Option<String> {
        reply_to(text, self.username(), self.rates.as_ref()).await
    }

    async fn handle_message(&self, chat_id: i64, text: &str) {
        let Some(reply) = self.respond(text).await else {
            return;
        };

        if let Err(e) = self.telegram.send_message(chat_id, &reply).await {
            error!(error = %e, chat_id, "Failed to send reply");
        }
    }

    /// Spawns a handler task for every text message in the batch. Returns the
    /// offset for the next poll and the spawned handlers.
    pub fn dispatch(
        &self,
        updates: Vec<Update>,
        offset: Option<i64>,
    ) -> (Option<i64>, Vec<JoinHandle<()>>) {
        let next_offset = updates
            .iter()
            .map(|update| update.update_id + 1)
            .max()
            .or(offset);

        let handlers = updates
            .into_iter()
            .filter_map(|update| {
                let message = update.message?;
                let text = message.text?;
                let chat_id = message.chat.id;
                let bot = self.clone();
                Some(tokio::spawn(async move {
                    bot.handle_message(chat_id, &text).await;
                }))
            })
            .collect();

        (next_offset, handlers)
    }

    pub async fn poll_once(
        &self,
        offset: Option<i64>,
    ) -> Result<(Option<i64>, Vec<JoinHandle<()>>)> {
        let updates = self.telegram.get_updates(offset).await?;
        Ok(self.dispatch(updates, offset))
    }

    /// Polls until `shutdown` resolves. Handlers still in flight are detached.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping poll loop");
                    return Ok(());
                }
                polled = self.poll_once(offset) => match polled {
                    Ok((next_offset, _)) => offset = next_offset,
                    Err(e) => {
                        warn!(error = %e, "Failed to poll updates");
                        tokio::time::sleep(POLL_ERROR_PAUSE).await;
                    }
                },
            }
        }
    }
}
