use axum::{Extension, Json, extract::State};

use lifeline_types::api::{Claims, DashboardStats};

use crate::error::{ApiError, FORBIDDEN, ResultExt};
use crate::policy;
use crate::state::AppState;

/// GET /dashboard-stats. Totals for the staff dashboard.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardStats>, ApiError> {
    let actor = state.actor(&claims).await?;
    if !policy::can_administer(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let stats = state
        .run(|db| {
            Ok(DashboardStats {
                total_donors: db.count_donors()?,
                total_requests: db.count_requests()?,
                total_funding: db.total_funding()?,
            })
        })
        .await
        .or_internal("Failed to fetch dashboard stats")?;

    Ok(Json(stats))
}
