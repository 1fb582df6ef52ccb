use super::CheckoutEngine;
use crate::domain::cart::Cart;
use crate::error::{CheckoutError, Result};

impl CheckoutEngine {
    /// Adds a product to the session's cart, creating the cart on first use.
    ///
    /// The catalog product is denormalized onto the cart line. If the product
    /// is already in the cart the quantity is merged into the existing line.
    /// A missing or zero quantity defaults to 1.
    pub async fn add_item(
        &self,
        session_id: &str,
        product_id: &str,
        quantity: Option<u32>,
    ) -> Result<Cart> {
        let product = self
            .catalog
            .get(product_id)
            .await?
            .ok_or_else(|| CheckoutError::ProductNotFound(product_id.to_string()))?;

        let mut cart = self
            .carts
            .get(session_id)
            .await?
            .unwrap_or_else(|| Cart::new(session_id));

        let quantity = quantity.filter(|q| *q > 0).unwrap_or(1);
        cart.add(&product, quantity);

        self.carts.put(cart.clone()).await?;
        Ok(cart)
    }

    /// Returns the session's cart, or the empty-cart view if the session has
    /// never shopped. Clients never have to special-case a missing cart.
    pub async fn get_cart(&self, session_id: &str) -> Result<Cart> {
        Ok(self
            .carts
            .get(session_id)
            .await?
            .unwrap_or_else(|| Cart::empty(session_id)))
    }

    /// Sets the quantity of a cart line exactly. A quantity of zero or less
    /// removes the line.
    pub async fn update_item(
        &self,
        session_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Cart> {
        let mut cart = self
            .carts
            .get(session_id)
            .await?
            .ok_or_else(|| CheckoutError::CartNotFound(session_id.to_string()))?;

        if !cart.set_quantity(product_id, quantity) {
            return Err(CheckoutError::ItemNotFound(product_id.to_string()));
        }

        self.carts.put(cart.clone()).await?;
        Ok(cart)
    }

    /// Removes a line from the cart. An absent line is not an error.
    pub async fn remove_item(&self, session_id: &str, product_id: &str) -> Result<Cart> {
        let mut cart = self
            .carts
            .get(session_id)
            .await?
            .ok_or_else(|| CheckoutError::CartNotFound(session_id.to_string()))?;

        cart.remove(product_id);

        self.carts.put(cart.clone()).await?;
        Ok(cart)
    }

    /// Deletes the session's cart. Succeeds even if no cart exists.
    pub async fn clear_cart(&self, session_id: &str) -> Result<()> {
        self.carts.delete(session_id).await
    }
}
