pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{Config, ConfigError};
pub use services::{verify, ClientError, QubeClient, WebhookError, WebhookVerifier};
pub use utils::{sign, SignatureHeader};
