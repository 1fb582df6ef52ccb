use crate::domain::payment::{CreatedIntent, IntentMetadata, IntentSnapshot, PaymentIntentStatus};
use crate::domain::ports::PaymentGateway;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A deterministic in-process stand-in for the payment provider.
///
/// Mints sequential intent ids (`pi_000001`, ...) and client secrets, tracks
/// intent status, and mints a charge id when a payment succeeds. Used by the
/// CLI harness and the tests; the real provider sits behind the same
/// `PaymentGateway` port.
#[derive(Default, Clone)]
pub struct SimulatedGateway {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    intents: HashMap<String, IntentRecord>,
    next_seq: u64,
    fail_next_create: bool,
}

struct IntentRecord {
    status: PaymentIntentStatus,
    client_secret: String,
    amount_minor: i64,
    currency: String,
    metadata: IntentMetadata,
    charge_id: Option<String>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `create_intent` call fail, simulating a provider
    /// outage at the worst moment of checkout.
    pub fn fail_next_create(&self) {
        self.lock().fail_next_create = true;
    }

    /// Marks an intent as succeeded on the provider side and mints the
    /// associated charge. Idempotent: a repeat call returns the charge that
    /// already exists.
    pub fn succeed(&self, intent_id: &str) -> Result<String> {
        let mut inner = self.lock();
        if !inner.intents.contains_key(intent_id) {
            return Err(CheckoutError::Gateway(format!(
                "no such payment intent: {intent_id}"
            )));
        }
        if let Some(charge_id) = inner
            .intents
            .get(intent_id)
            .and_then(|record| record.charge_id.clone())
        {
            return Ok(charge_id);
        }

        inner.next_seq += 1;
        let charge_id = format!("ch_{:06}", inner.next_seq);
        if let Some(record) = inner.intents.get_mut(intent_id) {
            record.status = PaymentIntentStatus::Succeeded;
            record.charge_id = Some(charge_id.clone());
        }
        Ok(charge_id)
    }

    /// The charge minted when the intent succeeded, if any.
    pub fn charge_of(&self, intent_id: &str) -> Option<String> {
        self.lock()
            .intents
            .get(intent_id)
            .and_then(|record| record.charge_id.clone())
    }

    pub fn amount_of(&self, intent_id: &str) -> Option<i64> {
        self.lock()
            .intents
            .get(intent_id)
            .map(|record| record.amount_minor)
    }

    pub fn currency_of(&self, intent_id: &str) -> Option<String> {
        self.lock()
            .intents
            .get(intent_id)
            .map(|record| record.currency.clone())
    }

    pub fn metadata_of(&self, intent_id: &str) -> Option<IntentMetadata> {
        self.lock()
            .intents
            .get(intent_id)
            .map(|record| record.metadata.clone())
    }

    /// Builds the wire body of a `payment_intent.succeeded` event.
    pub fn succeeded_event(intent_id: &str) -> Vec<u8> {
        serde_json::json!({
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": intent_id, "object": "payment_intent" } }
        })
        .to_string()
        .into_bytes()
    }

    /// Builds the wire body of a `payment_intent.payment_failed` event.
    pub fn failed_event(intent_id: &str) -> Vec<u8> {
        serde_json::json!({
            "type": "payment_intent.payment_failed",
            "data": { "object": { "id": intent_id, "object": "payment_intent" } }
        })
        .to_string()
        .into_bytes()
    }

    /// Builds the wire body of a `charge.refunded` event.
    pub fn refunded_event(charge_id: &str, intent_id: &str) -> Vec<u8> {
        serde_json::json!({
            "type": "charge.refunded",
            "data": { "object": { "id": charge_id, "object": "charge", "payment_intent": intent_id } }
        })
        .to_string()
        .into_bytes()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<CreatedIntent> {
        let mut inner = self.lock();
        if inner.fail_next_create {
            inner.fail_next_create = false;
            return Err(CheckoutError::Gateway(
                "simulated intent creation failure".to_string(),
            ));
        }

        inner.next_seq += 1;
        let intent_id = format!("pi_{:06}", inner.next_seq);
        let client_secret = format!("{intent_id}_secret_{:06}", inner.next_seq);
        inner.intents.insert(
            intent_id.clone(),
            IntentRecord {
                status: PaymentIntentStatus::RequiresPaymentMethod,
                client_secret: client_secret.clone(),
                amount_minor,
                currency: currency.to_string(),
                metadata,
                charge_id: None,
            },
        );

        Ok(CreatedIntent {
            intent_id,
            client_secret,
        })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<IntentSnapshot> {
        let inner = self.lock();
        let record = inner
            .intents
            .get(intent_id)
            .ok_or_else(|| CheckoutError::Gateway(format!("no such payment intent: {intent_id}")))?;
        Ok(IntentSnapshot {
            intent_id: intent_id.to_string(),
            status: record.status,
            client_secret: record.client_secret.clone(),
        })
    }
}
