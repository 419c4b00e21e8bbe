pub mod qube_client;
pub mod webhook_verifier;

pub use qube_client::{ClientError, QubeClient};
pub use webhook_verifier::{verify, WebhookError, WebhookVerifier};
