//! `/expenses` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use stockroom_core::validation::NewExpenseRequest;

use crate::error::ApiError;
use crate::routes::json_rejection;
use crate::state::AppState;
use crate::views::{views, ExpenseView};

/// `GET /expenses`
pub async fn list_expenses(State(state): State<AppState>) -> Result<Json<Vec<ExpenseView>>, ApiError> {
    let expenses = state.expenses().list_expenses().await?;
    Ok(Json(views(&expenses)))
}

/// `POST /expenses`
pub async fn create_expense(
    State(state): State<AppState>,
    payload: Result<Json<NewExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ApiError> {
    let Json(request) = payload.map_err(json_rejection)?;
    let expense = state.expenses().create_expense(&request).await?;
    Ok((StatusCode::CREATED, Json(ExpenseView::from(&expense))))
}
