//! Dashboard views for the three staff roles.

pub mod admin;
pub mod kitchen;
pub mod waiter;

pub use admin::{AdminBoard, AdminMetrics, AdminOrderRow, AdminView, StatusCount, admin_view};
pub use kitchen::{KitchenBoard, KitchenTicket, KitchenView, TicketLine, kitchen_view};
pub use waiter::{TableGroup, WaiterBoard, WaiterView, waiter_view};
