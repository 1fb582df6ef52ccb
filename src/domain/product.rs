use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product as seen by the cart.
///
/// The catalog is an external collaborator; this record is only used to
/// denormalize name/price/image onto a cart line at add-time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image: String,
    /// Units available in stock.
    pub quantity: u32,
}
