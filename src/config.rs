use crate::services::webhook_verifier::DEFAULT_MAX_AGE;
use secrecy::SecretString;
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://qubesync.com/api/v1/";

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_base_url: String,
    pub api_key: SecretString,
    pub webhook_secret: SecretString,
    pub previous_webhook_secret: Option<SecretString>,
    pub webhook_max_age: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: non_empty("PORT")
                .unwrap_or_else(|| "3010".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            api_base_url: non_empty("QUBE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: non_empty("QUBE_API_KEY")
                .map(SecretString::new)
                .ok_or(ConfigError::MissingApiKey)?,
            webhook_secret: non_empty("QUBE_WEBHOOK_SECRET")
                .map(SecretString::new)
                .ok_or(ConfigError::MissingWebhookSecret)?,
            previous_webhook_secret: non_empty("QUBE_WEBHOOK_SECRET_PREVIOUS").map(SecretString::new),
            webhook_max_age: match non_empty("QUBE_WEBHOOK_MAX_AGE") {
                Some(value) => value
                    .parse()
                    .ok()
                    .filter(|age: &i64| *age >= 0)
                    .ok_or(ConfigError::InvalidMaxAge)?,
                None => DEFAULT_MAX_AGE,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("QUBE_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("QUBE_WEBHOOK_SECRET environment variable is required")]
    MissingWebhookSecret,
    #[error("Invalid PORT value")]
    InvalidPort,
    #[error("Invalid QUBE_WEBHOOK_MAX_AGE value")]
    InvalidMaxAge,
}
