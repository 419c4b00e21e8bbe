use crate::config::{Config, ConfigError};
use crate::utils::{constant_time_eq, sign, SignatureHeader};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Default freshness window, in seconds.
pub const DEFAULT_MAX_AGE: i64 = 500;

/// Verifies a webhook delivery signed with a single `secret`.
///
/// Returns the decoded JSON body once the header is well formed, fresh, and
/// carries a signature matching the body.
pub fn verify(
    body: &[u8],
    header: &str,
    secret: &[u8],
    max_age: i64,
    now: i64,
) -> Result<JsonValue, WebhookError> {
    verify_with_secrets(body, header, &[secret], max_age, now)?;
    decode(body)
}

/// Checks the header against every secret in `secrets`, without decoding the body.
fn verify_with_secrets(
    body: &[u8],
    header: &str,
    secrets: &[&[u8]],
    max_age: i64,
    now: i64,
) -> Result<(), WebhookError> {
    let header = SignatureHeader::parse(header)?;

    if header.timestamp < now.saturating_sub(max_age) {
        return Err(WebhookError::StaleSignature {
            timestamp: header.timestamp,
            age: now.saturating_sub(header.timestamp),
            max_age,
        });
    }

    for secret in secrets {
        // HMAC takes keys of any length; a secret it refuses cannot match.
        let Ok(expected) = sign(body, secret) else {
            continue;
        };

        if header
            .signatures
            .iter()
            .any(|candidate| constant_time_eq(candidate.trim().as_bytes(), expected.as_bytes()))
        {
            return Ok(());
        }
    }

    Err(WebhookError::SignatureMismatch {
        candidates: header.signatures.len(),
    })
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, WebhookError> {
    serde_json::from_slice(body).map_err(WebhookError::PayloadDecode)
}

/// Webhook verifier bound to the configured secrets and freshness window.
///
/// Holds the current secret first and, during a rotation overlap, the previous
/// one. A delivery signed under either is accepted.
pub struct WebhookVerifier {
    secrets: Vec<SecretString>,
    max_age: i64,
}

impl WebhookVerifier {
    pub fn new(secret: SecretString, max_age: i64) -> Self {
        WebhookVerifier {
            secrets: vec![secret],
            max_age,
        }
    }

    /// Also accept signatures made with a secret that is being rotated out.
    pub fn with_previous_secret(mut self, secret: SecretString) -> Self {
        self.secrets.push(secret);
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        if config.webhook_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingWebhookSecret);
        }

        let mut verifier = WebhookVerifier::new(
            SecretString::new(config.webhook_secret.expose_secret().clone()),
            config.webhook_max_age,
        );

        if let Some(previous) = &config.previous_webhook_secret {
            verifier = verifier.with_previous_secret(SecretString::new(
                previous.expose_secret().clone(),
            ));
        }

        Ok(verifier)
    }

    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Verifies `body` against `header` at time `now` and decodes it as JSON.
    pub fn verify(&self, body: &[u8], header: &str, now: i64) -> Result<JsonValue, WebhookError> {
        self.verify_as(body, header, now)
    }

    /// Like [`WebhookVerifier::verify`], decoding into a caller-supplied type.
    pub fn verify_as<T: DeserializeOwned>(
        &self,
        body: &[u8],
        header: &str,
        now: i64,
    ) -> Result<T, WebhookError> {
        let secrets: Vec<&[u8]> = self
            .secrets
            .iter()
            .map(|s| s.expose_secret().as_bytes())
            .collect();

        verify_with_secrets(body, header, &secrets, self.max_age, now)?;
        decode(body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Malformed signature header: {reason}")]
    MalformedHeader { reason: &'static str },
    #[error("Signature timestamp {timestamp} is {age}s old (max {max_age}s)")]
    StaleSignature {
        timestamp: i64,
        age: i64,
        max_age: i64,
    },
    #[error("Webhook signature mismatch ({candidates} candidates checked)")]
    SignatureMismatch { candidates: usize },
    #[error("Invalid webhook payload: {0}")]
    PayloadDecode(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::format_signature_header;
    use serde::Deserialize;
    use serde_json::json;

    const SECRET: &[u8] = b"whsec_test";
    const BODY: &[u8] = br#"{"id":42}"#;

    fn header_for(body: &[u8], secret: &[u8], timestamp: i64) -> String {
        format_signature_header(timestamp, &[sign(body, secret).unwrap()])
    }

    #[test]
    fn test_verify_valid_delivery() {
        let header = header_for(BODY, SECRET, 1000);

        let payload = verify(BODY, &header, SECRET, 500, 1000).unwrap();

        assert_eq!(payload, json!({"id": 42}));
    }

    #[test]
    fn test_verify_stale_delivery() {
        let header = header_for(BODY, SECRET, 1000);

        let err = verify(BODY, &header, SECRET, 500, 2000).unwrap_err();

        match err {
            WebhookError::StaleSignature {
                timestamp,
                age,
                max_age,
            } => {
                assert_eq!(timestamp, 1000);
                assert_eq!(age, 1000);
                assert_eq!(max_age, 500);
            }
            other => panic!("expected stale signature, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_stale_even_with_bad_signature() {
        let header = "t=100,deadbeef";

        let err = verify(BODY, header, SECRET, 500, 1000).unwrap_err();

        assert!(matches!(err, WebhookError::StaleSignature { .. }));
    }

    #[test]
    fn test_verify_window_boundary_is_inclusive() {
        let header = header_for(BODY, SECRET, 500);

        assert!(verify(BODY, &header, SECRET, 500, 1000).is_ok());
        assert!(matches!(
            verify(BODY, &header, SECRET, 500, 1001),
            Err(WebhookError::StaleSignature { .. })
        ));
    }

    #[test]
    fn test_verify_accepts_future_timestamp() {
        let header = header_for(BODY, SECRET, 5000);

        assert!(verify(BODY, &header, SECRET, 500, 1000).is_ok());
    }

    #[test]
    fn test_verify_malformed_header() {
        let err = verify(BODY, "garbage", SECRET, 500, 1000).unwrap_err();

        assert!(matches!(err, WebhookError::MalformedHeader { .. }));
    }

    #[test]
    fn test_verify_tampered_body() {
        let header = header_for(BODY, SECRET, 1000);

        for position in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[position] ^= 0x20;

            let err = verify(&tampered, &header, SECRET, 500, 1000).unwrap_err();
            assert!(matches!(err, WebhookError::SignatureMismatch { .. }));
        }
    }

    #[test]
    fn test_verify_wrong_secret() {
        let header = header_for(BODY, b"whsec_other", 1000);

        let err = verify(BODY, &header, SECRET, 500, 1000).unwrap_err();

        assert!(matches!(
            err,
            WebhookError::SignatureMismatch { candidates: 1 }
        ));
    }

    #[test]
    fn test_verify_no_candidates() {
        let err = verify(BODY, "t=1000", SECRET, 500, 1000).unwrap_err();

        assert!(matches!(
            err,
            WebhookError::SignatureMismatch { candidates: 0 }
        ));
    }

    #[test]
    fn test_verify_second_candidate_matches() {
        let header = format_signature_header(
            1000,
            &[
                sign(BODY, b"whsec_old").unwrap(),
                format!(" {}", sign(BODY, SECRET).unwrap()),
            ],
        );

        assert!(verify(BODY, &header, SECRET, 500, 1000).is_ok());
        assert!(verify(BODY, &header, b"whsec_old", 500, 1000).is_ok());
    }

    #[test]
    fn test_verify_prefixed_candidate_does_not_match() {
        let header = format!("t=1000,v1={}", sign(BODY, SECRET).unwrap());

        let err = verify(BODY, &header, SECRET, 500, 1000).unwrap_err();

        assert!(matches!(err, WebhookError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_verify_upper_case_candidate_does_not_match() {
        let header = format_signature_header(1000, &[sign(BODY, SECRET).unwrap().to_uppercase()]);

        let err = verify(BODY, &header, SECRET, 500, 1000).unwrap_err();

        assert!(matches!(err, WebhookError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_verify_payload_decode_error() {
        let body = b"not json";
        let header = header_for(body, SECRET, 1000);

        let err = verify(body, &header, SECRET, 500, 1000).unwrap_err();

        assert!(matches!(err, WebhookError::PayloadDecode(_)));
    }

    #[test]
    fn test_verify_non_object_payload() {
        let body = b"[1,2,3]";
        let header = header_for(body, SECRET, 1000);

        let payload = verify(body, &header, SECRET, 500, 1000).unwrap();

        assert_eq!(payload, json!([1, 2, 3]));
    }

    #[test]
    fn test_verifier_accepts_previous_secret() {
        let verifier = WebhookVerifier::new(SecretString::new("whsec_new".to_string()), 500)
            .with_previous_secret(SecretString::new("whsec_old".to_string()));

        let old_header = header_for(BODY, b"whsec_old", 1000);
        let new_header = header_for(BODY, b"whsec_new", 1000);
        let foreign_header = header_for(BODY, b"whsec_foreign", 1000);

        assert!(verifier.verify(BODY, &old_header, 1000).is_ok());
        assert!(verifier.verify(BODY, &new_header, 1000).is_ok());
        assert!(matches!(
            verifier.verify(BODY, &foreign_header, 1000),
            Err(WebhookError::SignatureMismatch { .. })
        ));
    }

    fn config_from(vars: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_from_config_enables_rotation() {
        let config = config_from(&[
            ("QUBE_API_KEY", "key_123"),
            ("QUBE_WEBHOOK_SECRET", "whsec_new"),
            ("QUBE_WEBHOOK_SECRET_PREVIOUS", "whsec_old"),
            ("QUBE_WEBHOOK_MAX_AGE", "60"),
        ]);

        let verifier = WebhookVerifier::from_config(&config).unwrap();

        assert_eq!(verifier.max_age(), 60);
        assert!(verifier
            .verify(BODY, &header_for(BODY, b"whsec_old", 1000), 1000)
            .is_ok());
        assert!(verifier
            .verify(BODY, &header_for(BODY, b"whsec_new", 1000), 1000)
            .is_ok());
        assert!(matches!(
            verifier.verify(BODY, &header_for(BODY, b"whsec_old", 900), 1000),
            Err(WebhookError::StaleSignature { .. })
        ));
    }

    #[test]
    fn test_from_config_without_previous_secret() {
        let config = config_from(&[
            ("QUBE_API_KEY", "key_123"),
            ("QUBE_WEBHOOK_SECRET", "whsec_new"),
        ]);

        let verifier = WebhookVerifier::from_config(&config).unwrap();

        assert_eq!(verifier.max_age(), DEFAULT_MAX_AGE);
        assert!(matches!(
            verifier.verify(BODY, &header_for(BODY, b"whsec_old", 1000), 1000),
            Err(WebhookError::SignatureMismatch { .. })
        ));
    }

    #[test]
    fn test_from_config_rejects_empty_secret() {
        let mut config = config_from(&[
            ("QUBE_API_KEY", "key_123"),
            ("QUBE_WEBHOOK_SECRET", "whsec_new"),
        ]);
        config.webhook_secret = SecretString::new(String::new());

        let err = WebhookVerifier::from_config(&config).err().unwrap();

        assert!(matches!(err, ConfigError::MissingWebhookSecret));
    }

    #[test]
    fn test_verifier_decodes_typed_payload() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Delivery {
            id: u64,
        }

        let verifier = WebhookVerifier::new(SecretString::new("whsec_test".to_string()), 500);
        let header = header_for(BODY, SECRET, 1000);

        let delivery: Delivery = verifier.verify_as(BODY, &header, 1000).unwrap();

        assert_eq!(delivery, Delivery { id: 42 });
    }

    #[test]
    fn test_verifier_typed_payload_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Delivery {
            name: String,
        }

        let verifier = WebhookVerifier::new(SecretString::new("whsec_test".to_string()), 500);
        let header = header_for(BODY, SECRET, 1000);

        let err = verifier
            .verify_as::<Delivery>(BODY, &header, 1000)
            .unwrap_err();

        assert!(matches!(err, WebhookError::PayloadDecode(_)));
    }
}
