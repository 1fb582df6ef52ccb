use thiserror::Error;

/// Errors surfaced by the checkout core.
///
/// Validation errors (`ProductNotFound`, `CartNotFound`, `ItemNotFound`,
/// `EmptyCart`) are reported before any state is mutated. `Gateway` failures
/// are surfaced to the caller as-is and never retried internally.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("cart not found for session: {0}")]
    CartNotFound(String),
    #[error("item not in cart: {0}")]
    ItemNotFound(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("cart is empty")]
    EmptyCart,
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("malformed webhook event: {0}")]
    MalformedEvent(String),
    #[error("payment not confirmed")]
    PaymentNotConfirmed,
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CheckoutError {
    fn from(err: rocksdb::Error) -> Self {
        CheckoutError::Internal(Box::new(err))
    }
}
