use common::{OrderId, Revision};
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order's revision did not match the revision the caller expected.
    #[error(
        "Concurrency conflict for order {order_id}: expected revision {expected}, found {actual}"
    )]
    Conflict {
        order_id: OrderId,
        expected: Revision,
        actual: Revision,
    },

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order and lines handed to `persist_order` are not storable.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// A row read from the database could not be mapped to a record.
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
