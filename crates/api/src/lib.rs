//! HTTP API server for the restaurant order tracker.
//!
//! Provides REST endpoints for orders, the catalog and the three role
//! dashboards, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch};
use domain::OrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{Catalog, OrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Catalog + OrderStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::export))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::create::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).delete(routes::orders::delete::<S>),
        )
        .route("/orders/{id}/status", patch(routes::orders::update_status::<S>))
        .route("/tables", get(routes::catalog::tables::<S>))
        .route("/products", get(routes::catalog::products::<S>))
        .route("/product-types", get(routes::catalog::product_types::<S>))
        .route("/statuses", get(routes::catalog::statuses::<S>))
        .route("/dashboards/kitchen", get(routes::dashboards::kitchen::<S>))
        .route("/dashboards/waiter", get(routes::dashboards::waiter::<S>))
        .route("/dashboards/admin", get(routes::dashboards::admin::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a store in the shared application state.
pub fn create_state<S: Catalog + OrderStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        order_service: OrderService::new(store),
    })
}
