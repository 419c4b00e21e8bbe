use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A QuickBooks connection as returned by the QUBE API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

/// Standard `{"data": ...}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedConnection {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeneratedPassword {
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QwcResponse {
    pub qwc: Option<String>,
}
