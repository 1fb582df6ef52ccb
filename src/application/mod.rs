//! Application layer: the checkout engine orchestrating carts, orders and the
//! payment gateway behind the domain ports.

mod cart;
mod checkout;
mod reconciliation;

pub use self::checkout::CheckoutReceipt;

use crate::config::CheckoutConfig;
use crate::domain::ports::{CartStoreBox, OrderStoreBox, PaymentGatewayBox, ProductCatalogBox};

/// The main entry point for the checkout flow.
///
/// Owns the storage and gateway ports and exposes the cart operations, the
/// checkout orchestration, and the payment reconciliation triggers. Many
/// sessions may be served concurrently; all cross-trigger consistency is
/// enforced through the order store's compare-and-set transition.
pub struct CheckoutEngine {
    carts: CartStoreBox,
    orders: OrderStoreBox,
    catalog: ProductCatalogBox,
    gateway: PaymentGatewayBox,
    config: CheckoutConfig,
}

impl CheckoutEngine {
    /// Creates a new `CheckoutEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `carts` - The store for session carts.
    /// * `orders` - The store for order records.
    /// * `catalog` - The product catalog collaborator.
    /// * `gateway` - The payment provider adapter.
    pub fn new(
        carts: CartStoreBox,
        orders: OrderStoreBox,
        catalog: ProductCatalogBox,
        gateway: PaymentGatewayBox,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            carts,
            orders,
            catalog,
            gateway,
            config,
        }
    }
}
