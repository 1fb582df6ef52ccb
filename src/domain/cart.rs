use crate::domain::product::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cart line.
///
/// Name, price and image are denormalized copies of the catalog product taken
/// at add-time. They are never re-synced against the catalog: an order must
/// reflect the price at purchase time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image: String,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A session-scoped cart.
///
/// `total_price` is derived: every mutator recomputes it as the sum of line
/// totals before returning, so it always equals the sum over items at rest.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub session_id: String,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
}

impl Cart {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            items: Vec::new(),
            total_price: Decimal::ZERO,
        }
    }

    /// The view returned for a session with no cart: `{items: [], totalPrice: 0}`.
    pub fn empty(session_id: impl Into<String>) -> Self {
        Self::new(session_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merges `quantity` into an existing line for the product, or appends a
    /// new denormalized line.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem::from_product(product, quantity)),
        }
        self.recompute_total();
    }

    /// Sets the quantity of an existing line. A quantity of zero or less
    /// removes the line (deletion, not an error). Returns `false` if the
    /// product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
        else {
            return false;
        };

        if quantity <= 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.recompute_total();
        true
    }

    /// Removes the line for `product_id`. Absent lines are ignored.
    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|item| item.product_id != product_id);
        self.recompute_total();
    }

    fn recompute_total(&mut self) {
        self.total_price = self.items.iter().map(CartItem::line_total).sum();
    }
}
