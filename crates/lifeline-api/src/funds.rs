use axum::{
    Extension, Json,
    extract::State,
};
use tracing::info;
use uuid::Uuid;

use lifeline_types::api::{Claims, InsertResult, NewFund};
use lifeline_types::models::Fund;

use crate::error::{ApiError, ResultExt};
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /create-fund. Record a completed contribution.
pub async fn create_fund(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(fund): ApiJson<NewFund>,
) -> Result<Json<InsertResult>, ApiError> {
    if fund.name.trim().is_empty() || fund.email.trim().is_empty() {
        return Err(ApiError::invalid("Name and email are required"));
    }
    if !fund.amount.is_finite() || fund.amount <= 0.0 {
        return Err(ApiError::invalid("Invalid amount"));
    }

    let id = Uuid::new_v4().to_string();
    let created = state
        .run(move |db| db.insert_fund(&id, &fund))
        .await
        .or_internal("Failed to record fund")?;

    info!("Fund {} of {} recorded by {}", created.id, created.amount, claims.email);
    Ok(Json(InsertResult::new(created.id)))
}

/// GET /funds. Newest first.
pub async fn list_funds(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<Fund>>, ApiError> {
    let funds = state
        .run(|db| db.list_funds())
        .await
        .or_internal("Failed to fetch funds")?;
    Ok(Json(funds))
}
