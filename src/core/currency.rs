//! Rate table types and the conversion step

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::core::command::ConversionRequest;

/// The only currency the bot converts from.
pub const BASE_CURRENCY: &str = "usd";

#[derive(Debug, Error)]
pub enum RateError {
    /// Timeout, connection failure, bad status or an unreadable payload.
    #[error("rate source unreachable: {0}")]
    SourceUnavailable(String),
    #[error("Invalid currency code: {0}")]
    UnknownCurrency(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateEntry {
    #[serde(default)]
    pub code: String,
    pub name: Option<String>,
    pub rate: f64,
    #[serde(alias = "inverseRate")]
    pub inverse_rate: Option<f64>,
    pub date: Option<String>,
}

/// A base currency's rate table, keyed by lowercase currency code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, RateEntry>")]
pub struct RateTable {
    entries: HashMap<String, RateEntry>,
}

impl From<HashMap<String, RateEntry>> for RateTable {
    fn from(raw: HashMap<String, RateEntry>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(key, mut entry)| {
                let key = key.to_lowercase();
                if entry.code.is_empty() {
                    entry.code = key.to_uppercase();
                }
                (key, entry)
            })
            .collect();
        RateTable { entries }
    }
}

impl RateTable {
    pub fn get(&self, code: &str) -> Option<&RateEntry> {
        self.entries.get(&code.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub amount: f64,
    pub target_code: String,
    pub rate: f64,
    pub converted_amount: f64,
}

#[async_trait]
pub trait RateTableProvider: Send + Sync {
    async fn fetch_table(&self, base: &str) -> Result<RateTable, RateError>;
}

/// Fetches a fresh base table and converts the requested amount.
pub async fn convert(
    provider: &dyn RateTableProvider,
    request: &ConversionRequest,
) -> Result<ConversionResult, RateError> {
    let table = provider.fetch_table(BASE_CURRENCY).await?;
    debug!(entries = table.len(), "Fetched rate table");

    let entry = table
        .get(&request.target_code)
        .ok_or_else(|| RateError::UnknownCurrency(request.target_code.to_uppercase()))?;

    if !entry.rate.is_finite() || entry.rate <= 0.0 {
        return Err(RateError::SourceUnavailable(format!(
            "invalid rate {} for {}",
            entry.rate, entry.code
        )));
    }

    Ok(ConversionResult {
        amount: request.amount,
        target_code: request.target_code.clone(),
        rate: entry.rate,
        converted_amount: request.amount * entry.rate,
    })
}
