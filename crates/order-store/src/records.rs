//! Rows as the store persists them.
//!
//! These are flat: references to other rows are plain identifiers. Resolving
//! them into a denormalized view is the job of the domain's aggregate builder.

use chrono::{DateTime, Utc};
use common::{
    Money, OrderId, PersonId, ProductId, ProductTypeId, Revision, Role, StatusId, TableId, UserId,
};
use serde::{Deserialize, Serialize};

/// A row of the status vocabulary shared by orders, products and users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub id: StatusId,
    pub name: String,
}

/// The person behind a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    /// Returns "First Last".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A staff user account. Credentials are managed outside of this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub person_id: PersonId,
    pub role: Role,
    pub username: String,
    pub status_id: StatusId,
}

/// A dining table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub label: String,
}

/// A grouping of products (starter, main course, drink, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub type_id: ProductTypeId,
    pub name: String,
    pub price: Money,
    pub status_id: StatusId,
}

/// An order header about to be persisted. The store assigns the id and
/// the initial revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub creator_id: UserId,
    pub table_id: TableId,
    pub status_id: StatusId,
    pub created_at: DateTime<Utc>,
}

/// A line item about to be persisted with its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub notes: Option<String>,
    /// Catalog price at the moment the order was placed.
    pub unit_price: Money,
}

/// A persisted order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrder {
    pub id: OrderId,
    pub creator_id: UserId,
    pub table_id: TableId,
    pub status_id: StatusId,
    pub created_at: DateTime<Utc>,
    pub revision: Revision,
    pub lines: Vec<RawOrderLine>,
}

/// A persisted line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub notes: Option<String>,
    pub unit_price: Money,
}

impl RawOrderLine {
    pub(crate) fn from_new(order_id: OrderId, line: NewOrderLine) -> Self {
        Self {
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            notes: line.notes,
            unit_price: line.unit_price,
        }
    }
}
