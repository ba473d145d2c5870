use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{RateError, RateTable, RateTableProvider};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// FloatRatesProvider implementation for RateTableProvider
pub struct FloatRatesProvider {
    base_url: String,
    client: reqwest::Client,
}

impl FloatRatesProvider {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxbot/1.0")
            .timeout(timeout)
            .build()?;

        Ok(FloatRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> RateError {
    RateError::SourceUnavailable(format!("{context}: {err}"))
}

#[async_trait]
impl RateTableProvider for FloatRatesProvider {
    #[instrument(name = "FloatRatesFetch", skip(self), fields(base = %base))]
    async fn fetch_table(&self, base: &str) -> Result<RateTable, RateError> {
        let url = format!("{}/daily/{}.json", self.base_url, base.to_lowercase());
        debug!("Requesting rate table from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                unavailable("Request timed out", e)
            } else {
                unavailable("Request error", e)
            }
        })?;

        if !response.status().is_success() {
            return Err(RateError::SourceUnavailable(format!(
                "HTTP error: {} for {}",
                response.status(),
                url
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| unavailable("Failed to read response body", e))?;

        serde_json::from_str::<RateTable>(&text)
            .map_err(|e| unavailable("Failed to parse rate table", e))
    }
}
