//! Kitchen dashboard: the ticket queue, oldest first.

use chrono::{DateTime, Utc};
use common::{OrderId, Revision, Role};
use domain::{CompletedOrder, OrderStatus, allowed_targets};
use order_store::Table;
use serde::Serialize;

use crate::projection::Projection;

/// One line of a kitchen ticket. Prices are not shown to the kitchen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketLine {
    pub product_name: String,
    pub product_type: String,
    pub quantity: u32,
    pub notes: Option<String>,
}

/// An order as the kitchen sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KitchenTicket {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub revision: Revision,
    pub table: Table,
    pub waiter: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<TicketLine>,

    /// The step the kitchen can take on this ticket, if any.
    pub next_status: Option<OrderStatus>,
}

impl KitchenTicket {
    fn from_order(order: &CompletedOrder) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            revision: order.revision,
            table: order.table.clone(),
            waiter: order.creator.display_name.clone(),
            created_at: order.created_at,
            lines: order
                .lines
                .iter()
                .map(|line| TicketLine {
                    product_name: line.product_name.clone(),
                    product_type: line.product_type.clone(),
                    quantity: line.quantity,
                    notes: line.notes.clone(),
                })
                .collect(),
            next_status: allowed_targets(order.status, Role::Kitchen)
                .into_iter()
                .next(),
        }
    }
}

/// Tickets grouped by status, each group a FIFO queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KitchenBoard {
    pub pending: Vec<KitchenTicket>,
    pub in_preparation: Vec<KitchenTicket>,
    pub ready: Vec<KitchenTicket>,
}

impl KitchenBoard {
    /// Total number of tickets on the board.
    pub fn len(&self) -> usize {
        self.pending.len() + self.in_preparation.len() + self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the kitchen board.
///
/// Only `Pending`, `InPreparation` and `Ready` orders appear. Within each
/// group tickets are ordered by `created_at`, then by id.
pub fn kitchen_view(orders: &[CompletedOrder]) -> KitchenBoard {
    let mut queue: Vec<&CompletedOrder> = orders
        .iter()
        .filter(|o| o.status.is_in_kitchen())
        .collect();
    queue.sort_by_key(|o| (o.created_at, o.id));

    let mut board = KitchenBoard::default();
    for order in queue {
        let ticket = KitchenTicket::from_order(order);
        match order.status {
            OrderStatus::Pending => board.pending.push(ticket),
            OrderStatus::InPreparation => board.in_preparation.push(ticket),
            OrderStatus::Ready => board.ready.push(ticket),
            _ => {}
        }
    }
    board
}

/// [`Projection`] wrapper around [`kitchen_view`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KitchenView;

impl Projection for KitchenView {
    type View = KitchenBoard;

    fn name(&self) -> &'static str {
        "kitchen"
    }

    fn project(&self, orders: &[CompletedOrder]) -> KitchenBoard {
        kitchen_view(orders)
    }
}
