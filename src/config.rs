//! Startup configuration, read once from the environment.
//!
//! Every credential and list identifier is required before the server can
//! operate; a missing value is a startup failure, never a per-request one.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default webhook listen port.
const DEFAULT_PORT: u16 = 5000;

/// Default path for the processed-event log.
const DEFAULT_PROCESSED_PATH: &str = "./data/processed-events.log";

/// Slack credentials.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token for chat.postMessage.
    pub bot_token: SecretString,
}

/// Trello credentials.
#[derive(Debug, Clone)]
pub struct TrelloConfig {
    pub api_key: SecretString,
    pub token: SecretString,
}

/// The fixed set of board list identifiers, resolved at startup.
#[derive(Debug, Clone)]
pub struct ListIds {
    pub on_deck: String,
    pub this_week: String,
    pub pause: String,
    pub done: String,
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub slack: SlackConfig,
    pub trello: TrelloConfig,
    pub lists: ListIds,
    /// Webhook listen port.
    pub port: u16,
    /// Path of the append-only processed-event log.
    pub processed_path: String,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("BOARDBOT_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "BOARDBOT_PORT".into(),
                    message: format!("not a valid port number: {raw:?}"),
                })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            slack: SlackConfig {
                bot_token: SecretString::from(required("SLACK_BOT_TOKEN")?),
            },
            trello: TrelloConfig {
                api_key: SecretString::from(required("TRELLO_API_KEY")?),
                token: SecretString::from(required("TRELLO_TOKEN")?),
            },
            lists: ListIds {
                on_deck: required("TRELLO_LIST_ID_ON_DECK")?,
                this_week: required("TRELLO_LIST_ID_THIS_WEEK")?,
                pause: required("TRELLO_LIST_ID_PAUSE")?,
                done: required("TRELLO_LIST_ID_DONE")?,
            },
            port,
            processed_path: std::env::var("BOARDBOT_PROCESSED_PATH")
                .unwrap_or_else(|_| DEFAULT_PROCESSED_PATH.to_string()),
        })
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}
