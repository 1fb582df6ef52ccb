use crate::error::{CheckoutError, Result};
use serde::Deserialize;
use std::io::Read;

/// One operation of a checkout script.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Add a product to the session's cart.
    Add,
    /// Set the quantity of a cart line (zero removes it).
    Update,
    /// Remove a cart line.
    Remove,
    /// Delete the session's cart.
    Clear,
    /// Start a checkout for the session.
    Checkout,
    /// The shopper pays the session's current intent, then the client
    /// confirms (Trigger A).
    Pay,
    /// Deliver a signed `payment_intent.succeeded` webhook (Trigger B).
    Notify,
    /// Deliver a signed `payment_intent.payment_failed` webhook.
    Fail,
    /// Deliver a signed `charge.refunded` webhook.
    Refund,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OpRecord {
    pub op: OpKind,
    pub session: String,
    pub product: Option<String>,
    pub quantity: Option<i64>,
}

/// Reads checkout operations from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<OpRecord>`,
/// with whitespace trimming and flexible record lengths.
pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    /// Creates a new `ScriptReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes operations.
    pub fn ops(self) -> impl Iterator<Item = Result<OpRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, session, product, quantity\n\
                    add, s1, p1, 2\n\
                    checkout, s1, , ";
        let reader = ScriptReader::new(data.as_bytes());
        let results: Vec<Result<OpRecord>> = reader.ops().collect();

        assert_eq!(results.len(), 2);
        let add = results[0].as_ref().unwrap();
        assert_eq!(add.op, OpKind::Add);
        assert_eq!(add.session, "s1");
        assert_eq!(add.product.as_deref(), Some("p1"));
        assert_eq!(add.quantity, Some(2));

        let checkout = results[1].as_ref().unwrap();
        assert_eq!(checkout.op, OpKind::Checkout);
        assert!(checkout.product.is_none());
        assert!(checkout.quantity.is_none());
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, session, product, quantity\ninvalid, s1, p1, 1";
        let reader = ScriptReader::new(data.as_bytes());
        let results: Vec<Result<OpRecord>> = reader.ops().collect();

        assert!(results[0].is_err());
    }
}
