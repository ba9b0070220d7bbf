//! `/inventory-items` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use stockroom_core::validation::{NewItemRequest, RestockRequest};

use crate::error::ApiError;
use crate::routes::json_rejection;
use crate::state::AppState;
use crate::views::{views, DiscrepancyView, ItemView, LedgerEntryView};

/// `GET /inventory-items`
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<ItemView>>, ApiError> {
    let items = state.inventory().list_items().await?;
    Ok(Json(views(&items)))
}

/// `POST /inventory-items`
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<NewItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemView>), ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let item = state.inventory().create_item(&request).await?;
    Ok((StatusCode::CREATED, Json(ItemView::from(&item))))
}

/// `POST /inventory-items/:id/restock`
pub async fn restock_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RestockRequest>, JsonRejection>,
) -> Result<Json<ItemView>, ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let item = state.inventory().restock_item(&id, &request).await?;
    Ok(Json(ItemView::from(&item)))
}

/// `GET /inventory-items/low-stock`
pub async fn low_stock(State(state): State<AppState>) -> Result<Json<Vec<ItemView>>, ApiError> {
    let items = state.inventory().low_stock_items().await?;
    Ok(Json(views(&items)))
}

/// `GET /inventory-items/:id/ledger`
pub async fn item_ledger(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LedgerEntryView>>, ApiError> {
    let entries = state.inventory().ledger_for(&id).await?;
    Ok(Json(views(&entries)))
}

/// `GET /inventory-items/reconcile`
pub async fn reconcile(State(state): State<AppState>) -> Result<Json<Vec<DiscrepancyView>>, ApiError> {
    let found = state.inventory().reconcile().await?;
    Ok(Json(views(&found)))
}
