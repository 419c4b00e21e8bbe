use crate::services::WebhookError;

/// A parsed `t=<timestamp>,<sig>,...` signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parses the header sent alongside each webhook delivery.
    ///
    /// Only the timestamp segment is validated. Everything after the first
    /// comma is kept as a raw candidate (trimmed), with no `v1=` prefix check.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut segments = header.split(',');
        let timestamp_segment = segments.next().unwrap_or_default();

        let mut pair = timestamp_segment.split('=');
        let timestamp = match (pair.next().map(str::trim), pair.next().map(str::trim)) {
            (Some("t"), Some(value)) => {
                value
                    .parse::<i64>()
                    .map_err(|_| WebhookError::MalformedHeader {
                        reason: "timestamp is not an integer",
                    })?
            }
            _ => {
                return Err(WebhookError::MalformedHeader {
                    reason: "first segment must be t=<timestamp>",
                })
            }
        };

        let signatures = segments.map(|s| s.trim().to_string()).collect();

        Ok(SignatureHeader {
            timestamp,
            signatures,
        })
    }
}
