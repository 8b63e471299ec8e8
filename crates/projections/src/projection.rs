//! Core projection trait.

use std::time::Instant;

use domain::CompletedOrder;
use serde::Serialize;

/// A pure transform from the current list of orders to one dashboard.
///
/// Projections own no state. Every call builds a fresh view from the orders
/// it is handed, so a render never observes a half-applied update.
pub trait Projection {
    /// The dashboard this projection produces.
    type View: Serialize;

    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Builds the view.
    fn project(&self, orders: &[CompletedOrder]) -> Self::View;
}

/// Runs a projection, recording how long it took.
#[tracing::instrument(skip_all, fields(projection = projection.name(), orders = orders.len()))]
pub fn render<P: Projection>(projection: &P, orders: &[CompletedOrder]) -> P::View {
    let start = Instant::now();
    let view = projection.project(orders);

    metrics::histogram!("dashboard_render_duration_seconds", "view" => projection.name())
        .record(start.elapsed().as_secs_f64());
    tracing::debug!("dashboard rendered");
    view
}
