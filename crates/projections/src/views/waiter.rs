//! Waiter dashboard: open orders grouped by table.

use std::collections::BTreeMap;

use common::{Money, TableId, UserId};
use domain::{CompletedOrder, OrderStatus};
use order_store::Table;
use serde::Serialize;

use crate::projection::Projection;

/// The orders at one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableGroup {
    pub table: Table,
    pub orders: Vec<CompletedOrder>,
}

impl TableGroup {
    /// Orders waiting at the pass for someone to carry them out.
    pub fn ready_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Ready)
            .count()
    }

    /// Value of everything at the table.
    pub fn total(&self) -> Money {
        self.orders.iter().map(CompletedOrder::total).sum()
    }
}

/// Everything one waiter needs to look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaiterBoard {
    pub user_id: UserId,
    pub tables: Vec<TableGroup>,
}

impl WaiterBoard {
    pub fn order_count(&self) -> usize {
        self.tables.iter().map(|t| t.orders.len()).sum()
    }
}

fn is_relevant(order: &CompletedOrder, user_id: UserId) -> bool {
    let own_open = order.creator.id == user_id && !order.status.is_terminal();
    let shared = matches!(order.status, OrderStatus::Pending | OrderStatus::Ready);
    own_open || shared
}

/// Builds the board for `user_id`.
///
/// An order shows up if the waiter placed it and it is still open, or if it
/// is `Pending` or `Ready` no matter who placed it. Tables are ordered by id
/// and orders within a table oldest first.
pub fn waiter_view(orders: &[CompletedOrder], user_id: UserId) -> WaiterBoard {
    let mut groups: BTreeMap<TableId, TableGroup> = BTreeMap::new();

    for order in orders.iter().filter(|o| is_relevant(o, user_id)) {
        groups
            .entry(order.table_id())
            .or_insert_with(|| TableGroup {
                table: order.table.clone(),
                orders: Vec::new(),
            })
            .orders
            .push(order.clone());
    }

    let tables = groups
        .into_values()
        .map(|mut group| {
            group.orders.sort_by_key(|o| (o.created_at, o.id));
            group
        })
        .collect();

    WaiterBoard { user_id, tables }
}

/// [`Projection`] wrapper around [`waiter_view`].
#[derive(Debug, Clone, Copy)]
pub struct WaiterView {
    pub user_id: UserId,
}

impl WaiterView {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

impl Projection for WaiterView {
    type View = WaiterBoard;

    fn name(&self) -> &'static str {
        "waiter"
    }

    fn project(&self, orders: &[CompletedOrder]) -> WaiterBoard {
        waiter_view(orders, self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use common::OrderId;

    use super::*;
    use crate::views::fixtures::order;

    const MARIA: i64 = 2;
    const CARLOS: i64 = 3;

    fn ids(group: &TableGroup) -> Vec<i64> {
        group.orders.iter().map(|o| o.id.as_i64()).collect()
    }

    #[test]
    fn own_open_orders_and_shared_pending_ready() {
        let orders = vec![
            order(1, OrderStatus::Created, 1, MARIA, 0, 100, 1),
            order(2, OrderStatus::InPreparation, 1, MARIA, 1, 100, 1),
            order(3, OrderStatus::Delivered, 1, MARIA, 2, 100, 1),
            order(4, OrderStatus::Created, 2, CARLOS, 3, 100, 1),
            order(5, OrderStatus::InPreparation, 2, CARLOS, 4, 100, 1),
            order(6, OrderStatus::Pending, 2, CARLOS, 5, 100, 1),
            order(7, OrderStatus::Ready, 3, CARLOS, 6, 100, 1),
            order(8, OrderStatus::Cancelled, 3, MARIA, 7, 100, 1),
        ];

        let board = waiter_view(&orders, UserId::new(MARIA));

        assert_eq!(board.tables.len(), 3);
        assert_eq!(ids(&board.tables[0]), vec![1, 2]);
        assert_eq!(ids(&board.tables[1]), vec![6]);
        assert_eq!(ids(&board.tables[2]), vec![7]);
        assert_eq!(board.tables[2].ready_count(), 1);
        assert_eq!(board.order_count(), 4);
    }

    #[test]
    fn tables_sorted_by_id_and_orders_oldest_first() {
        let orders = vec![
            order(3, OrderStatus::Pending, 7, MARIA, 20, 100, 1),
            order(2, OrderStatus::Pending, 2, MARIA, 10, 100, 1),
            order(1, OrderStatus::Pending, 7, MARIA, 0, 100, 1),
        ];

        let board = waiter_view(&orders, UserId::new(MARIA));

        let tables: Vec<_> = board.tables.iter().map(|t| t.table.id.as_i64()).collect();
        assert_eq!(tables, vec![2, 7]);
        assert_eq!(ids(&board.tables[1]), vec![1, 3]);
    }

    #[test]
    fn table_total_sums_its_orders() {
        let orders = vec![
            order(1, OrderStatus::Pending, 4, MARIA, 0, 250, 2),
            order(2, OrderStatus::Ready, 4, CARLOS, 1, 1000, 1),
        ];

        let board = waiter_view(&orders, UserId::new(MARIA));

        assert_eq!(board.tables[0].total(), Money::from_cents(1500));
        assert_eq!(board.tables[0].orders[1].id, OrderId::new(2));
    }
}
