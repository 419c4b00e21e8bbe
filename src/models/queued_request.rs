use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Parameters for queueing a request against a connection.
///
/// At least one of `request_xml` or `request_json` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueuedRequestParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_xml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_json: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl QueuedRequestParams {
    pub fn xml(request_xml: impl Into<String>) -> Self {
        QueuedRequestParams {
            request_xml: Some(request_xml.into()),
            ..Default::default()
        }
    }

    pub fn json(request_json: JsonValue) -> Self {
        QueuedRequestParams {
            request_json: Some(request_json),
            ..Default::default()
        }
    }

    pub fn with_webhook_url(mut self, webhook_url: impl Into<String>) -> Self {
        self.webhook_url = Some(webhook_url.into());
        self
    }

    pub fn has_request(&self) -> bool {
        let has_xml = self
            .request_xml
            .as_deref()
            .is_some_and(|xml| !xml.trim().is_empty());
        let has_json = self
            .request_json
            .as_ref()
            .is_some_and(|json| !is_empty_json(json));

        has_xml || has_json
    }
}

fn is_empty_json(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(a) => a.is_empty(),
        JsonValue::Object(o) => o.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct QueuedRequestBody<'a> {
    pub queued_request: &'a QueuedRequestParams,
}

/// A request waiting in (or already processed by) the QUBE queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedRequest {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub request_xml: Option<String>,
    #[serde(default)]
    pub response_xml: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}
