//! Runtime configuration read from the environment (and `.env` via dotenvy).

use crate::{Result, StorefrontError};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://store_bot.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token; the bot is not started without it.
    pub bot_token: Option<String>,
    pub admin_ids: Vec<i64>,
    /// `@channel` username or numeric chat id receiving confirmed orders.
    pub channel_id: Option<String>,
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub currency: String,
    pub admin_api_token: Option<String>,
    pub seed_sample_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            admin_ids: vec![],
            channel_id: None,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            nats_url: None,
            currency: DEFAULT_CURRENCY.to_string(),
            admin_api_token: None,
            seed_sample_data: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let admin_ids = match get("ADMIN_IDS") {
            Some(raw) => parse_admin_ids(&raw)?,
            None => vec![],
        };
        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| StorefrontError::Config(format!("PORT is not a port number: {raw}")))?,
            None => DEFAULT_PORT,
        };
        let seed_sample_data = match get("SEED_SAMPLE_DATA").as_deref() {
            None => false,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => return Err(StorefrontError::Config(format!("SEED_SAMPLE_DATA must be a boolean, got {other}"))),
        };

        Ok(Self {
            bot_token: get("BOT_TOKEN").or_else(|| get("TOKEN")),
            admin_ids,
            channel_id: get("CHANNEL_ID"),
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            port,
            nats_url: get("NATS_URL"),
            currency: get("STORE_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()).to_uppercase(),
            admin_api_token: get("ADMIN_API_TOKEN"),
            seed_sample_data,
        })
    }

    pub fn is_admin(&self, telegram_id: i64) -> bool { self.admin_ids.contains(&telegram_id) }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<i64>().map_err(|_| StorefrontError::Config(format!("ADMIN_IDS contains a non-numeric id: {id}"))))
        .collect()
}
