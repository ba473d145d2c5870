use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use tracing::debug;

pub const TOKEN_VAR: &str = "BOT_TOKEN";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RATES_BASE_URL: &str = "https://www.floatrates.com";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct AppConfig {
    pub bot_token: SecretString,
    pub telegram_api_url: String,
    pub rates_base_url: String,
    pub poll_timeout_secs: u64,
}

impl AppConfig {
    pub fn new(bot_token: &str) -> Result<Self> {
        let token = bot_token.trim();
        if token.is_empty() {
            bail!("{TOKEN_VAR} is set but empty");
        }

        Ok(AppConfig {
            bot_token: SecretString::new(token.to_string()),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            rates_base_url: DEFAULT_RATES_BASE_URL.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
        })
    }

    /// Reads the bot token from the process environment, after loading a
    /// `.env` file from the working directory if one exists.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(e).context("Failed to load .env file"),
        }

        let token = std::env::var(TOKEN_VAR)
            .with_context(|| format!("{TOKEN_VAR} must be set in the environment"))?;
        Self::new(&token)
    }

    /// Reads the bot token from a dotenv file without modifying the process
    /// environment.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to read env file: {}", path.display()))?;

        for entry in entries {
            let (key, value) =
                entry.with_context(|| format!("Failed to parse env file: {}", path.display()))?;
            if key == TOKEN_VAR {
                debug!("Found {TOKEN_VAR} in {}", path.display());
                return Self::new(&value);
            }
        }

        bail!("{TOKEN_VAR} not found in {}", path.display())
    }

    pub fn with_telegram_api_url(mut self, url: &str) -> Self {
        self.telegram_api_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_rates_base_url(mut self, url: &str) -> Self {
        self.rates_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    pub fn token(&self) -> &str {
        self.bot_token.expose_secret()
    }
}
