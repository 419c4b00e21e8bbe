use crate::services::{WebhookError, WebhookVerifier};
use actix_web::{web, HttpRequest, HttpResponse, Result};
use chrono::Utc;

pub const SIGNATURE_HEADER: &str = "X-Qube-Signature";

/// Receives QUBE webhook deliveries and authenticates them before acknowledging.
pub async fn qube_webhook(
    req: HttpRequest,
    body: web::Bytes,
    verifier: web::Data<WebhookVerifier>,
) -> Result<HttpResponse> {
    let signature = match req.headers().get(SIGNATURE_HEADER).map(|h| h.to_str()) {
        Some(Ok(signature)) => signature,
        Some(Err(_)) => {
            return Ok(reject(&WebhookError::MalformedHeader {
                reason: "header is not visible ASCII",
            }))
        }
        None => {
            log::warn!("Missing {SIGNATURE_HEADER} header on QUBE webhook");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing signature"
            })));
        }
    };

    let now = Utc::now().timestamp();

    // Verify against the raw bytes, never a re-serialized body.
    let payload = match verifier.verify(&body, signature, now) {
        Ok(payload) => payload,
        Err(e) => return Ok(reject(&e)),
    };

    let request_id = payload["id"]
        .as_str()
        .map(|s| s.to_string())
        .or_else(|| payload["id"].as_i64().map(|i| i.to_string()));

    log::info!(
        "Received QUBE webhook (request: {})",
        request_id.as_deref().unwrap_or("unknown")
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "received",
        "request_id": request_id
    })))
}

fn reject(error: &WebhookError) -> HttpResponse {
    match error {
        WebhookError::MalformedHeader { reason } => {
            log::warn!("Rejected QUBE webhook with malformed signature header: {reason}");
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Malformed signature header"
            }))
        }
        WebhookError::StaleSignature {
            timestamp,
            age,
            max_age,
        } => {
            log::warn!(
                "Rejected stale QUBE webhook: timestamp {timestamp} is {age}s old (max {max_age}s)"
            );
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Stale signature"
            }))
        }
        WebhookError::SignatureMismatch { candidates } => {
            log::warn!("Rejected QUBE webhook: no match among {candidates} signatures");
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid signature"
            }))
        }
        WebhookError::PayloadDecode(e) => {
            log::error!("Authenticated QUBE webhook carried an invalid payload: {e}");
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": "Invalid JSON payload"
            }))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhooks/qube", web::post().to(qube_webhook));
}
