pub mod connection;
pub mod queued_request;

pub use connection::{Connection, DataEnvelope};
pub use queued_request::{QueuedRequest, QueuedRequestParams};
