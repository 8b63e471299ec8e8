//! Read-only catalog endpoints used to fill the ordering screens.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use order_store::{Catalog, OrderStore, Product, ProductType, StatusRow, Table};
use serde::Deserialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Only products that can go on a new order.
    #[serde(default)]
    pub active: bool,
}

/// GET /tables
#[tracing::instrument(skip(state))]
pub async fn tables<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Table>>, ApiError> {
    Ok(Json(state.order_service.store().list_tables().await?))
}

/// GET /products?active=true
#[tracing::instrument(skip(state))]
pub async fn products<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let mut products = state.order_service.store().list_products().await?;
    if filter.active {
        let vocabulary = state.order_service.vocabulary().await?;
        products.retain(|p| vocabulary.is_active(p.status_id));
    }
    Ok(Json(products))
}

/// GET /product-types
#[tracing::instrument(skip(state))]
pub async fn product_types<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductType>>, ApiError> {
    Ok(Json(state.order_service.store().list_product_types().await?))
}

/// GET /statuses
#[tracing::instrument(skip(state))]
pub async fn statuses<S: Catalog + OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<StatusRow>>, ApiError> {
    Ok(Json(state.order_service.store().list_statuses().await?))
}
