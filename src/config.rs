use std::env;

/// Settings for the checkout engine itself.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// ISO currency code sent to the payment provider when creating intents.
    pub currency: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: "inr".to_string(),
        }
    }
}

/// Settings for webhook signature verification.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared secret used to verify the provider's event signatures.
    pub secret: String,
    /// Maximum accepted age of a signed timestamp, in seconds.
    pub tolerance_secs: i64,
}

impl WebhookConfig {
    pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: Self::DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Reads the secret from `CHECKOUT_WEBHOOK_SECRET`, falling back to a
    /// development-only value.
    pub fn from_env() -> Self {
        let secret = env::var("CHECKOUT_WEBHOOK_SECRET")
            .unwrap_or_else(|_| "whsec_dev_secret".to_string());
        Self::new(secret)
    }
}
