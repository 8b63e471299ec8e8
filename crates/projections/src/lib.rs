//! Dashboard projections for the restaurant order tracker.
//!
//! Every dashboard is a pure function of the current order list:
//! - [`kitchen_view`]: the ticket queue, grouped by status, oldest first
//! - [`waiter_view`]: one waiter's open orders plus anything to pick up, by table
//! - [`admin_view`]: every order with totals and revenue figures
//!
//! The [`Projection`] trait wraps each one so callers can render any of them
//! through [`render`], which records timing metrics.

pub mod projection;
pub mod views;

pub use projection::{Projection, render};
pub use views::{
    AdminBoard, AdminMetrics, AdminOrderRow, AdminView, KitchenBoard, KitchenTicket, KitchenView,
    StatusCount, TableGroup, TicketLine, WaiterBoard, WaiterView, admin_view, kitchen_view,
    waiter_view,
};
