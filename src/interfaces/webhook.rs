//! Inbound webhook adapter: signature verification and event decoding.
//!
//! The signature check always precedes payload inspection. Only a verified
//! body is decoded into a [`PaymentEvent`] and dispatched to reconciliation.

use crate::application::CheckoutEngine;
use crate::config::WebhookConfig;
use crate::domain::event::PaymentEvent;
use crate::error::{CheckoutError, Result};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Acknowledgement returned to the provider. Receipt is acknowledged
/// regardless of the business-level outcome.
#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
pub struct WebhookAck {
    pub received: bool,
}

/// Verifies provider signatures of the form `t=<unix-ts>,v1=<hex-hmac>`,
/// where the HMAC-SHA256 is computed over `"{t}.{body}"` with the shared
/// secret. Stale timestamps are rejected to blunt replay.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    config: WebhookConfig,
}

impl WebhookVerifier {
    pub fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    /// Checks the signature header against the raw body. Any defect in the
    /// header (missing parts, bad hex, stale timestamp, digest mismatch) is
    /// reported as `InvalidSignature` with no detail leaked to the caller.
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<()> {
        self.verify_at(payload, signature_header, Utc::now().timestamp())
    }

    fn verify_at(&self, payload: &[u8], signature_header: &str, now: i64) -> Result<()> {
        let mut timestamp: Option<i64> = None;
        let mut candidates: Vec<Vec<u8>> = Vec::new();

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse().ok(),
                Some(("v1", value)) => {
                    if let Ok(bytes) = hex::decode(value) {
                        candidates.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(CheckoutError::InvalidSignature)?;
        if candidates.is_empty() {
            return Err(CheckoutError::InvalidSignature);
        }
        if (now - timestamp).abs() > self.config.tolerance_secs {
            return Err(CheckoutError::InvalidSignature);
        }

        for candidate in &candidates {
            let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
                .map_err(|_| CheckoutError::InvalidSignature)?;
            mac.update(timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);
            if mac.verify_slice(candidate).is_ok() {
                return Ok(());
            }
        }
        Err(CheckoutError::InvalidSignature)
    }

    /// Verifies the signature, then decodes the body into a domain event.
    pub fn verify_and_parse(&self, payload: &[u8], signature_header: &str) -> Result<PaymentEvent> {
        self.verify(payload, signature_header)?;
        parse_event(payload)
    }
}

/// Signs a payload the way the provider would. Used by the CLI harness and
/// the tests to produce deliverable webhook requests.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| CheckoutError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

/// Decodes a verified body into the tagged event union.
///
/// Unknown kinds map to `Unrecognized` rather than an error; a recognized
/// kind with a defective object is `MalformedEvent`.
fn parse_event(payload: &[u8]) -> Result<PaymentEvent> {
    let envelope: Envelope = serde_json::from_slice(payload)
        .map_err(|e| CheckoutError::MalformedEvent(e.to_string()))?;

    let object = &envelope.data.object;
    let object_id = || {
        object
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| CheckoutError::MalformedEvent("event object has no id".to_string()))
    };

    match envelope.kind.as_str() {
        "payment_intent.succeeded" => Ok(PaymentEvent::IntentSucceeded {
            intent_id: object_id()?,
        }),
        "payment_intent.payment_failed" => Ok(PaymentEvent::IntentFailed {
            intent_id: object_id()?,
        }),
        "charge.refunded" => {
            let intent_id = object
                .get("payment_intent")
                .and_then(|id| id.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    CheckoutError::MalformedEvent("charge has no payment_intent".to_string())
                })?;
            Ok(PaymentEvent::ChargeRefunded {
                charge_id: object_id()?,
                intent_id,
            })
        }
        _ => Ok(PaymentEvent::Unrecognized {
            kind: envelope.kind,
        }),
    }
}

/// Full webhook entry point: verify, decode, dispatch, acknowledge.
pub async fn process(
    engine: &CheckoutEngine,
    verifier: &WebhookVerifier,
    payload: &[u8],
    signature_header: &str,
) -> Result<WebhookAck> {
    let event = verifier.verify_and_parse(payload, signature_header)?;
    engine.apply_event(event).await?;
    Ok(WebhookAck { received: true })
}
