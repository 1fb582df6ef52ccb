use checkout::application::{CheckoutEngine, CheckoutReceipt};
use checkout::config::{CheckoutConfig, WebhookConfig};
use checkout::domain::product::Product;
use checkout::error::{CheckoutError, Result as CoreResult};
use checkout::infrastructure::gateway_sim::SimulatedGateway;
use checkout::infrastructure::in_memory::{InMemoryCartStore, InMemoryCatalog, InMemoryOrderStore};
#[cfg(feature = "storage-rocksdb")]
use checkout::infrastructure::rocksdb::RocksDbStore;
use checkout::interfaces::csv::order_writer::OrderWriter;
use checkout::interfaces::csv::script_reader::{OpKind, OpRecord, ScriptReader};
use checkout::interfaces::webhook::{self, WebhookVerifier};
use chrono::Utc;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file (op, session, product, quantity)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

/// Drives the engine from script operations, playing both the shopper and
/// the payment provider.
struct Harness {
    engine: CheckoutEngine,
    gateway: SimulatedGateway,
    verifier: WebhookVerifier,
    webhook_secret: String,
    receipts: HashMap<String, CheckoutReceipt>,
}

impl Harness {
    async fn apply(&mut self, record: OpRecord) -> CoreResult<()> {
        match record.op {
            OpKind::Add => {
                let product = require(record.product, "product")?;
                let quantity = record.quantity.and_then(|q| u32::try_from(q).ok());
                self.engine
                    .add_item(&record.session, &product, quantity)
                    .await?;
            }
            OpKind::Update => {
                let product = require(record.product, "product")?;
                self.engine
                    .update_item(&record.session, &product, record.quantity.unwrap_or(0))
                    .await?;
            }
            OpKind::Remove => {
                let product = require(record.product, "product")?;
                self.engine.remove_item(&record.session, &product).await?;
            }
            OpKind::Clear => {
                self.engine.clear_cart(&record.session).await?;
            }
            OpKind::Checkout => {
                let receipt = self.engine.start_checkout(&record.session).await?;
                self.receipts.insert(record.session, receipt);
            }
            OpKind::Pay => {
                let intent_id = self.intent_for(&record.session)?;
                self.gateway.succeed(&intent_id)?;
                self.engine.confirm_payment(&intent_id, None, None).await?;
            }
            OpKind::Notify => {
                // The provider only emits intent-succeeded once the payment
                // actually landed on its side.
                let intent_id = self.intent_for(&record.session)?;
                self.gateway.succeed(&intent_id)?;
                self.deliver(SimulatedGateway::succeeded_event(&intent_id))
                    .await?;
            }
            OpKind::Fail => {
                let intent_id = self.intent_for(&record.session)?;
                self.deliver(SimulatedGateway::failed_event(&intent_id))
                    .await?;
            }
            OpKind::Refund => {
                // A refund presupposes a captured charge.
                let intent_id = self.intent_for(&record.session)?;
                let charge_id = self.gateway.succeed(&intent_id)?;
                self.deliver(SimulatedGateway::refunded_event(&charge_id, &intent_id))
                    .await?;
            }
        }
        Ok(())
    }

    fn intent_for(&self, session: &str) -> CoreResult<String> {
        self.receipts
            .get(session)
            .map(|receipt| receipt.payment_intent_id.clone())
            .ok_or_else(|| {
                CheckoutError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("no checkout on record for session {session}"),
                ))
            })
    }

    /// Delivers a provider event through the full signed webhook path.
    async fn deliver(&self, payload: Vec<u8>) -> CoreResult<()> {
        let header = webhook::sign_payload(&self.webhook_secret, Utc::now().timestamp(), &payload)?;
        webhook::process(&self.engine, &self.verifier, &payload, &header).await?;
        Ok(())
    }
}

fn require(field: Option<String>, what: &str) -> CoreResult<String> {
    field.ok_or_else(|| {
        CheckoutError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("script line missing {what}"),
        ))
    })
}

/// The demo catalog the server seeds at startup.
fn demo_catalog() -> Vec<Product> {
    let entries = [
        ("p1", "Wireless Headphones", dec!(2499), "https://m.media-amazon.com/images/I/61LJwFvVT5L._SX679_.jpg", 50),
        ("p2", "Smart Watch", dec!(5999), "https://m.media-amazon.com/images/I/71VyJM3BRFL._SX679_.jpg", 30),
        ("p3", "USB-C Cable", dec!(399), "https://m.media-amazon.com/images/I/61qC6c3b+LL._SX679_.jpg", 100),
        ("p4", "Portable Speaker", dec!(1499), "https://m.media-amazon.com/images/I/71Vx+j+aO8L._SX679_.jpg", 40),
        ("p5", "Phone Case", dec!(599), "https://m.media-amazon.com/images/I/61qC7XptY5L._SX679_.jpg", 80),
        ("p6", "Screen Protector", dec!(299), "https://m.media-amazon.com/images/I/61qC7XptY5L._SX679_.jpg", 120),
        ("p7", "Wireless Charger", dec!(799), "https://m.media-amazon.com/images/I/71tIrUtf0jL._SX679_.jpg", 60),
        ("p8", "Phone Tripod", dec!(899), "https://m.media-amazon.com/images/I/71pJPfvAbqL._SX679_.jpg", 45),
    ];
    entries
        .into_iter()
        .map(|(id, name, price, image, quantity)| Product {
            id: id.to_string(),
            name: name.to_string(),
            price,
            description: String::new(),
            image: image.to_string(),
            quantity,
        })
        .collect()
}

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr; stdout carries the orders CSV.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let gateway = SimulatedGateway::new();
    let catalog = InMemoryCatalog::with_products(demo_catalog());
    let webhook_config = WebhookConfig::from_env();
    let webhook_secret = webhook_config.secret.clone();

    #[cfg(feature = "storage-rocksdb")]
    let engine = if let Some(db_path) = cli.db_path.as_ref() {
        // Use persistent storage (RocksDB) for carts and orders.
        let store = RocksDbStore::open(db_path).into_diagnostic()?;
        CheckoutEngine::new(
            Box::new(store.clone()),
            Box::new(store),
            Box::new(catalog),
            Box::new(gateway.clone()),
            CheckoutConfig::default(),
        )
    } else {
        CheckoutEngine::new(
            Box::new(InMemoryCartStore::new()),
            Box::new(InMemoryOrderStore::new()),
            Box::new(catalog),
            Box::new(gateway.clone()),
            CheckoutConfig::default(),
        )
    };
    #[cfg(not(feature = "storage-rocksdb"))]
    let engine = CheckoutEngine::new(
        Box::new(InMemoryCartStore::new()),
        Box::new(InMemoryOrderStore::new()),
        Box::new(catalog),
        Box::new(gateway.clone()),
        CheckoutConfig::default(),
    );

    let mut harness = Harness {
        engine,
        gateway,
        verifier: WebhookVerifier::new(webhook_config),
        webhook_secret,
        receipts: HashMap::new(),
    };

    // Apply the script operations.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = ScriptReader::new(file);
    for op_result in reader.ops() {
        match op_result {
            Ok(op) => {
                if let Err(e) = harness.apply(op).await {
                    eprintln!("Error applying operation: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {e}");
            }
        }
    }

    // Output the final order table.
    let mut orders = harness.engine.all_orders().await.into_diagnostic()?;
    orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}
