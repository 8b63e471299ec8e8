//! Order endpoints: create, read, change status, delete.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{OrderId, Revision, Role, TableId, UserId};
use domain::{
    CompletedOrder, CreateOrder, DeleteOrder, OrderLineRequest, OrderStatus, TransitionStatus,
};
use order_store::{Catalog, OrderStore};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(alias = "creatorId")]
    pub creator_id: UserId,
    #[serde(alias = "tableId")]
    pub table_id: TableId,
    pub lines: Vec<OrderLineRequest>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(alias = "targetStatus")]
    pub target_status: OrderStatus,
    #[serde(alias = "actingRole")]
    pub acting_role: Role,
    #[serde(default, alias = "expectedRevision")]
    pub expected_revision: Option<Revision>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(alias = "actingRole")]
    pub acting_role: Option<String>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderDeletedResponse {
    pub order_id: OrderId,
    pub deleted: bool,
}

// -- Handlers --

/// POST /orders: create an order with its lines.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CompletedOrder>), ApiError> {
    let Json(req) = payload?;
    let mut cmd = CreateOrder::new(req.creator_id, req.table_id, req.lines);
    if req.draft {
        cmd = cmd.as_draft();
    }

    let order = state.order_service.create_order(cmd).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders: every order, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CompletedOrder>>, ApiError> {
    let orders = state.order_service.list_orders().await?;
    Ok(Json(orders))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<CompletedOrder>, ApiError> {
    let order = state.order_service.get_order(OrderId::new(id)).await?;
    Ok(Json(order))
}

/// PATCH /orders/{id}/status: move an order along its lifecycle.
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<CompletedOrder>, ApiError> {
    let Json(req) = payload?;
    let mut cmd = TransitionStatus::new(OrderId::new(id), req.target_status, req.acting_role);
    if let Some(revision) = req.expected_revision {
        cmd = cmd.expecting(revision);
    }

    let order = state.order_service.transition_status(cmd).await?;
    Ok(Json(order))
}

/// DELETE /orders/{id}?acting_role=Admin
#[tracing::instrument(skip(state, params))]
pub async fn delete<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<OrderDeletedResponse>, ApiError> {
    let role = parse_role(params.acting_role.as_deref())?;
    let order_id = OrderId::new(id);

    state
        .order_service
        .delete_order(DeleteOrder::new(order_id, role))
        .await?;

    Ok(Json(OrderDeletedResponse {
        order_id,
        deleted: true,
    }))
}

fn parse_role(raw: Option<&str>) -> Result<Role, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest("acting_role is required".to_string()))?;
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid acting_role: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(Some("Admin")).unwrap(), Role::Admin);
        assert_eq!(parse_role(Some("kitchen")).unwrap(), Role::Kitchen);
        assert!(matches!(parse_role(None), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            parse_role(Some("chef")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_create_request_accepts_both_casings() {
        let snake: CreateOrderRequest = serde_json::from_str(
            r#"{"creator_id": 2, "table_id": 5, "lines": [{"product_id": 3, "quantity": 2}]}"#,
        )
        .unwrap();
        let camel: CreateOrderRequest = serde_json::from_str(
            r#"{"creatorId": 2, "tableId": 5, "lines": [{"productId": 3, "quantity": 2}]}"#,
        )
        .unwrap();

        assert_eq!(snake.creator_id, camel.creator_id);
        assert_eq!(snake.lines, camel.lines);
        assert!(!snake.draft);
    }
}
