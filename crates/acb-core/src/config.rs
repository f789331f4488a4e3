use std::env;

use crate::{errors::Error, targets::TargetRegistry, Result};

/// Typed configuration, loaded from the environment (a `.env` file is
/// honored when present).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Moderation group chat the anonymous notifications go to.
    pub group_chat_id: i64,
    pub database_url: String,
    /// Minimum interval between two accepted comments from the same user.
    pub rate_limit_secs: i64,
    pub profanity_words: Vec<String>,
    pub targets: TargetRegistry,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bot_token = require("BOT_TOKEN")?;
        let database_url = require("DATABASE_URL")?;
        let group_chat_id = require("GROUP_CHAT_ID")?
            .parse::<i64>()
            .map_err(|_| Error::Config("GROUP_CHAT_ID must be a valid integer".to_string()))?;

        let rate_limit_secs = match env_str("RATE_LIMIT_SECONDS") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                Error::Config("RATE_LIMIT_SECONDS must be a valid integer".to_string())
            })?,
            None => 120,
        };

        let profanity_words = parse_csv(
            &env_str("PROFANITY_WORDS").unwrap_or_else(|| "badword1,badword2".to_string()),
        );

        let targets = match env_str("TARGETS") {
            Some(raw) => TargetRegistry::parse(&raw)?,
            None => TargetRegistry::default(),
        };

        Ok(Self {
            bot_token,
            group_chat_id,
            database_url,
            rate_limit_secs,
            profanity_words,
            targets,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env_str(key).ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().and_then(non_empty)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
