use serde::{Deserialize, Serialize};

/// Provider-side status of a payment intent.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    Processing,
    Succeeded,
    Canceled,
}

/// Out-of-band correlation data attached to an intent at creation time.
///
/// The gateway only ever knows the intent id; these tags let a human re-query
/// the provider and trace an intent back to the order that produced it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IntentMetadata {
    pub order_id: String,
    pub session_id: String,
}

/// Result of creating a payment intent with the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedIntent {
    pub intent_id: String,
    /// Client-facing token the shopper needs to complete the payment.
    pub client_secret: String,
}

/// A point-in-time read of an intent from the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentSnapshot {
    pub intent_id: String,
    pub status: PaymentIntentStatus,
    pub client_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentIntentStatus::RequiresPaymentMethod).unwrap(),
            "\"requires_payment_method\""
        );
        let status: PaymentIntentStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(status, PaymentIntentStatus::Succeeded);
    }
}
