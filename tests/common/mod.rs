use checkout::application::CheckoutEngine;
use checkout::config::{CheckoutConfig, WebhookConfig};
use checkout::domain::product::Product;
use checkout::infrastructure::gateway_sim::SimulatedGateway;
use checkout::infrastructure::in_memory::{InMemoryCartStore, InMemoryCatalog, InMemoryOrderStore};
use checkout::interfaces::webhook::{self, WebhookVerifier};
use chrono::Utc;
use rust_decimal_macros::dec;

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "p1".to_string(),
            name: "Wireless Headphones".to_string(),
            price: dec!(100),
            description: "Noise cancelling".to_string(),
            image: "headphones.jpg".to_string(),
            quantity: 50,
        },
        Product {
            id: "p2".to_string(),
            name: "USB-C Cable".to_string(),
            price: dec!(399),
            description: "1 meter".to_string(),
            image: "cable.jpg".to_string(),
            quantity: 100,
        },
    ]
}

pub fn engine_with(gateway: SimulatedGateway) -> CheckoutEngine {
    CheckoutEngine::new(
        Box::new(InMemoryCartStore::new()),
        Box::new(InMemoryOrderStore::new()),
        Box::new(InMemoryCatalog::with_products(products())),
        Box::new(gateway),
        CheckoutConfig::default(),
    )
}

pub fn verifier() -> WebhookVerifier {
    WebhookVerifier::new(WebhookConfig::new(WEBHOOK_SECRET))
}

/// Signs a payload with the test secret at the current time.
pub fn signed(payload: &[u8]) -> String {
    webhook::sign_payload(WEBHOOK_SECRET, Utc::now().timestamp(), payload).unwrap()
}
