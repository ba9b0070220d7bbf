use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::error::ApiError;
use crate::state::AppState;
use crate::views::OverviewView;

/// `GET /overview`
pub async fn overview(State(state): State<AppState>) -> Result<Json<OverviewView>, ApiError> {
    let overview = state.overview().overview(Utc::now()).await?;
    Ok(Json(overview.into()))
}
