//! `/sales` handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use stockroom_core::report::sales_csv_filename;
use stockroom_core::validation::{NewSaleRequest, SalesQuery};

use crate::error::ApiError;
use crate::routes::{json_rejection, query_rejection};
use crate::state::AppState;
use crate::views::{views, SaleView, SalesView};

#[derive(Debug, Deserialize)]
pub struct ReverseSaleParams {
    pub id: Option<String>,
}

/// `GET /sales`
pub async fn list_sales(
    State(state): State<AppState>,
    query: Result<Query<SalesQuery>, QueryRejection>,
) -> Result<Json<SalesView>, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let report = state.sales().query_sales(&query).await?;

    Ok(Json(SalesView {
        sales: views(&report.sales),
        stats: report.stats.into(),
    }))
}

/// `POST /sales`
pub async fn record_sale(
    State(state): State<AppState>,
    payload: Result<Json<NewSaleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let recorded = state.sales().record_sale(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Sale recorded successfully",
            "sale": SaleView::from(&recorded),
        })),
    ))
}

/// `DELETE /sales?id=<sale_id>`
pub async fn reverse_sale(
    State(state): State<AppState>,
    params: Result<Query<ReverseSaleParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(query_rejection)?;
    state.sales().reverse_sale(params.id.as_deref()).await?;

    Ok(Json(json!({
        "message": "Sale deleted and stock restored successfully",
    })))
}

/// `GET /sales/export`
pub async fn export_sales(
    State(state): State<AppState>,
    query: Result<Query<SalesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(query_rejection)?;
    let csv = state.sales().export_csv(&query).await?;
    let disposition = format!("attachment; filename=\"{}\"", sales_csv_filename(Utc::now()));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
