use thiserror::Error;
use uuid::Uuid;

use super::order::StockShortage;

/// Business-level failure taxonomy. Infrastructure code converts diesel/r2d2
/// errors into `Store`; everything else is an expected outcome with its own
/// HTTP mapping in `crate::errors`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The advisory pre-check found at least one product with less stock than
    /// requested. Carries the full set so the caller can report every
    /// shortage at once rather than the first one only.
    #[error("Insufficient stock")]
    InsufficientStock(Vec<StockShortage>),

    /// A guarded decrement failed inside the checkout transaction: a
    /// concurrent checkout consumed the stock between the pre-check and the
    /// transactional recheck. The whole transaction was rolled back.
    #[error("Insufficient stock (recheck failed). Please try again.")]
    StockConflict { product_id: Uuid, requested: i32 },

    #[error("Storage error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }
}
