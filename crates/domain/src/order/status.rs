//! Order statuses and the catalog vocabulary that names them.

use std::collections::HashMap;
use std::str::FromStr;

use common::StatusId;
use order_store::StatusRow;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The status of an order in its lifecycle.
///
/// ```text
/// Created ──► Pending ──► InPreparation ──► Ready ──► Delivered
///    │           │              │             │
///    └───────────┴──────────────┴─────────────┴──────► Cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Draft: table and items chosen but not yet sent to the kitchen.
    Created,

    /// Waiting for the kitchen to pick it up.
    Pending,

    /// Being prepared.
    InPreparation,

    /// Prepared, waiting for a waiter.
    Ready,

    /// Served to the table (terminal state).
    Delivered,

    /// Cancelled by an administrator (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// All statuses, progression first, then `Cancelled`.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Created,
        OrderStatus::Pending,
        OrderStatus::InPreparation,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true while the kitchen still has something to do or hand over.
    pub fn is_in_kitchen(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::InPreparation | OrderStatus::Ready
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Pending => "Pending",
            OrderStatus::InPreparation => "InPreparation",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::Integrity(format!("unknown order status name {s:?}")))
    }
}

/// What a row of the status vocabulary means to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMeaning {
    Order(OrderStatus),
    Active,
    Inactive,
    /// A name the core does not interpret.
    Other,
}

impl StatusMeaning {
    fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("Active") {
            StatusMeaning::Active
        } else if name.eq_ignore_ascii_case("Inactive") {
            StatusMeaning::Inactive
        } else {
            name.parse()
                .map(StatusMeaning::Order)
                .unwrap_or(StatusMeaning::Other)
        }
    }
}

/// Maps the catalog's status rows to their meaning.
///
/// Numeric ids are catalog data: nothing in the core assumes a particular id
/// for a particular status. A vocabulary can only be built when every order
/// status and `Active` are present, so [`StatusVocabulary::id_of`] is total.
#[derive(Debug, Clone)]
pub struct StatusVocabulary {
    meanings: HashMap<StatusId, StatusMeaning>,
    order_ids: HashMap<OrderStatus, StatusId>,
}

impl StatusVocabulary {
    /// Builds the vocabulary from the catalog's status rows.
    pub fn from_rows(rows: &[StatusRow]) -> Result<Self, DomainError> {
        let mut meanings = HashMap::with_capacity(rows.len());
        let mut order_ids = HashMap::with_capacity(OrderStatus::ALL.len());

        for row in rows {
            let meaning = StatusMeaning::from_name(&row.name);
            if let StatusMeaning::Order(status) = meaning
                && order_ids.insert(status, row.id).is_some()
            {
                return Err(DomainError::Integrity(format!(
                    "status {status} appears more than once in the catalog"
                )));
            }
            meanings.insert(row.id, meaning);
        }

        if let Some(missing) = OrderStatus::ALL
            .into_iter()
            .find(|s| !order_ids.contains_key(s))
        {
            return Err(DomainError::Integrity(format!(
                "status catalog has no row for {missing}"
            )));
        }
        if !meanings.values().any(|m| *m == StatusMeaning::Active) {
            return Err(DomainError::Integrity(
                "status catalog has no Active row".to_string(),
            ));
        }

        Ok(Self {
            meanings,
            order_ids,
        })
    }

    /// Returns what a status id means, if the id exists.
    pub fn meaning(&self, id: StatusId) -> Option<StatusMeaning> {
        self.meanings.get(&id).copied()
    }

    /// Returns the order status for an id, or `None` if the id does not
    /// denote an order status.
    pub fn order_status(&self, id: StatusId) -> Option<OrderStatus> {
        match self.meaning(id)? {
            StatusMeaning::Order(status) => Some(status),
            _ => None,
        }
    }

    /// Returns the catalog id of an order status.
    pub fn id_of(&self, status: OrderStatus) -> StatusId {
        // Construction guarantees every order status is present
        self.order_ids[&status]
    }

    /// Returns true if the id is the `Active` status.
    pub fn is_active(&self, id: StatusId) -> bool {
        self.meaning(id) == Some(StatusMeaning::Active)
    }
}
