//! Domain error types.

use common::{OrderId, ProductId, Revision, Role, TableId, UserId};
use order_store::StoreError;
use thiserror::Error;

use crate::order::DenyReason;

/// Problems with the input of an order creation. These are user-correctable
/// and reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Order has no lines.
    #[error("An order needs at least one line")]
    NoLines,

    /// Invalid quantity.
    #[error("Invalid quantity for product {product_id}: 0 (must be at least 1)")]
    ZeroQuantity { product_id: ProductId },

    #[error("Invalid quantity for product {product_id}: {quantity} (at most {max})")]
    QuantityTooLarge {
        product_id: ProductId,
        quantity: u32,
        max: u32,
    },

    /// The same product is listed twice.
    #[error("Product {product_id} is listed more than once")]
    DuplicateProduct { product_id: ProductId },

    #[error("Unknown product: {product_id}")]
    UnknownProduct { product_id: ProductId },

    #[error("Product {product_id} is not available")]
    InactiveProduct { product_id: ProductId },

    #[error("Unknown table: {table_id}")]
    UnknownTable { table_id: TableId },

    #[error("Unknown user: {user_id}")]
    UnknownCreator { user_id: UserId },

    #[error("User {user_id} is inactive")]
    InactiveCreator { user_id: UserId },

    /// The store refused the order.
    #[error("{0}")]
    Rejected(String),
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or incomplete creation input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The acting role may not perform this operation at all.
    #[error("Role {role} may not {action}")]
    InsufficientRole { role: Role, action: &'static str },

    /// The lifecycle refused a status change.
    #[error("Transition denied: {0}")]
    TransitionDenied(DenyReason),

    /// The order changed since the caller last observed it.
    #[error(
        "Concurrency conflict for order {order_id}: expected revision {expected}, found {actual}"
    )]
    Conflict {
        order_id: OrderId,
        expected: Revision,
        actual: Revision,
    },

    /// Stored data breaks an invariant the core relies on.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    pub(crate) fn order_not_found(order_id: OrderId) -> Self {
        DomainError::NotFound {
            entity: "Order",
            id: order_id.as_i64(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict {
                order_id,
                expected,
                actual,
            } => DomainError::Conflict {
                order_id,
                expected,
                actual,
            },
            StoreError::OrderNotFound(order_id) => DomainError::order_not_found(order_id),
            StoreError::InvalidOrder(msg) => ValidationError::Rejected(msg).into(),
            other => DomainError::Store(other),
        }
    }
}
