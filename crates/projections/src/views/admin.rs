//! Admin dashboard: every order plus revenue figures.

use common::Money;
use domain::{CompletedOrder, OrderStatus};
use serde::Serialize;

use crate::projection::Projection;

/// An order with its total precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminOrderRow {
    #[serde(flatten)]
    pub order: CompletedOrder,
    pub total: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Aggregate figures over all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminMetrics {
    pub order_count: usize,

    /// One entry per status, in lifecycle order, including zero counts.
    pub by_status: Vec<StatusCount>,

    /// Sum of delivered order totals.
    pub revenue: Money,

    /// Sum of totals of orders that are not yet delivered or cancelled.
    pub open_value: Money,

    pub cancelled_value: Money,
}

impl AdminMetrics {
    pub fn count_of(&self, status: OrderStatus) -> usize {
        self.by_status
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminBoard {
    pub orders: Vec<AdminOrderRow>,
    pub metrics: AdminMetrics,
}

/// Builds the admin board. Orders keep the order they were given in.
pub fn admin_view(orders: &[CompletedOrder]) -> AdminBoard {
    let mut by_status: Vec<StatusCount> = OrderStatus::ALL
        .iter()
        .map(|&status| StatusCount { status, count: 0 })
        .collect();
    let mut revenue = Money::zero();
    let mut open_value = Money::zero();
    let mut cancelled_value = Money::zero();

    let rows = orders
        .iter()
        .map(|order| {
            let total = order.total();
            if let Some(entry) = by_status.iter_mut().find(|c| c.status == order.status) {
                entry.count += 1;
            }
            match order.status {
                OrderStatus::Delivered => revenue += total,
                OrderStatus::Cancelled => cancelled_value += total,
                _ => open_value += total,
            }
            AdminOrderRow {
                order: order.clone(),
                total,
            }
        })
        .collect();

    AdminBoard {
        orders: rows,
        metrics: AdminMetrics {
            order_count: orders.len(),
            by_status,
            revenue,
            open_value,
            cancelled_value,
        },
    }
}

/// [`Projection`] wrapper around [`admin_view`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminView;

impl Projection for AdminView {
    type View = AdminBoard;

    fn name(&self) -> &'static str {
        "admin"
    }

    fn project(&self, orders: &[CompletedOrder]) -> AdminBoard {
        admin_view(orders)
    }
}
