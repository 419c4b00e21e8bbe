pub mod webhook;

pub use webhook::{configure, qube_webhook, SIGNATURE_HEADER};
