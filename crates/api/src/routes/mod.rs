//! HTTP route handlers.

pub mod catalog;
pub mod dashboards;
pub mod health;
pub mod metrics;
pub mod orders;

use domain::OrderService;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub order_service: OrderService<S>,
}
