//! Role dashboards, re-derived from the full order list on every request.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use common::UserId;
use domain::DomainError;
use order_store::{Catalog, OrderStore};
use projections::{
    AdminBoard, AdminView, KitchenBoard, KitchenView, WaiterBoard, WaiterView, render,
};
use serde::Deserialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct WaiterParams {
    #[serde(alias = "userId")]
    pub user_id: UserId,
}

/// GET /dashboards/kitchen
#[tracing::instrument(skip(state))]
pub async fn kitchen<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<KitchenBoard>, ApiError> {
    let orders = state.order_service.list_orders().await?;
    Ok(Json(render(&KitchenView, &orders)))
}

/// GET /dashboards/waiter?user_id=N
#[tracing::instrument(skip(state))]
pub async fn waiter<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<WaiterParams>,
) -> Result<Json<WaiterBoard>, ApiError> {
    if state
        .order_service
        .store()
        .find_user(params.user_id)
        .await?
        .is_none()
    {
        return Err(DomainError::NotFound {
            entity: "User",
            id: params.user_id.as_i64(),
        }
        .into());
    }

    let orders = state.order_service.list_orders().await?;
    Ok(Json(render(&WaiterView::new(params.user_id), &orders)))
}

/// GET /dashboards/admin
#[tracing::instrument(skip(state))]
pub async fn admin<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<AdminBoard>, ApiError> {
    let orders = state.order_service.list_orders().await?;
    Ok(Json(render(&AdminView, &orders)))
}
