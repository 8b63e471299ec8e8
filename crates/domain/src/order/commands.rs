//! Order commands.

use common::{OrderId, ProductId, Revision, Role, TableId, UserId};
use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    #[serde(alias = "productId")]
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderLineRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            notes: None,
        }
    }

    /// Attaches free-text notes for the kitchen.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The user placing the order.
    pub creator_id: UserId,

    pub table_id: TableId,

    pub lines: Vec<OrderLineRequest>,

    /// Keep the order as a `Created` draft instead of sending it straight
    /// to the kitchen as `Pending`.
    pub draft: bool,
}

impl CreateOrder {
    /// Creates a new CreateOrder command for an order that goes straight to
    /// the kitchen.
    pub fn new(creator_id: UserId, table_id: TableId, lines: Vec<OrderLineRequest>) -> Self {
        Self {
            creator_id,
            table_id,
            lines,
            draft: false,
        }
    }

    /// Marks the order as a draft.
    pub fn as_draft(mut self) -> Self {
        self.draft = true;
        self
    }

    /// The status the order starts in.
    pub fn initial_status(&self) -> OrderStatus {
        if self.draft {
            OrderStatus::Created
        } else {
            OrderStatus::Pending
        }
    }
}

/// Command to move an order to another status.
#[derive(Debug, Clone)]
pub struct TransitionStatus {
    pub order_id: OrderId,
    pub target: OrderStatus,
    pub acting_role: Role,

    /// Revision the caller last observed. If set and the order has moved on,
    /// the command fails with a conflict.
    pub expected_revision: Option<Revision>,
}

impl TransitionStatus {
    pub fn new(order_id: OrderId, target: OrderStatus, acting_role: Role) -> Self {
        Self {
            order_id,
            target,
            acting_role,
            expected_revision: None,
        }
    }

    /// Requires the order to still be at `revision`.
    pub fn expecting(mut self, revision: Revision) -> Self {
        self.expected_revision = Some(revision);
        self
    }
}

/// Command to delete an order and its lines.
#[derive(Debug, Clone)]
pub struct DeleteOrder {
    pub order_id: OrderId,
    pub acting_role: Role,
}

impl DeleteOrder {
    pub fn new(order_id: OrderId, acting_role: Role) -> Self {
        Self {
            order_id,
            acting_role,
        }
    }
}
