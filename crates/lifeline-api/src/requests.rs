use axum::{
    Extension, Json,
    extract::{Query, State},
};
use tracing::{info, warn};
use uuid::Uuid;

use lifeline_types::api::{
    Claims, DeleteResult, DonateRequest, DonationRequestPatch, InsertResult, NewDonationRequest,
    StatusChange, StatusQuery, SuccessResponse, TransitionRequest, UpdateResult,
};
use lifeline_types::models::{DonationRequest, DonationStatus};

use crate::error::{ApiError, BLOCKED, FORBIDDEN, ResultExt};
use crate::extract::{ApiJson, IdPath};
use crate::policy;
use crate::state::AppState;

const RECENT_LIMIT: u32 = 3;
const NOT_FOUND: &str = "Not found";

async fn load_request(state: &AppState, id: &str) -> Result<DonationRequest, ApiError> {
    let id = id.to_string();
    state
        .run(move |db| db.get_request(&id))
        .await
        .or_internal("Error fetching request")?
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

/// POST /create-donation-request
///
/// The requester is the session's user; a body `requesterEmail` naming anyone
/// else is refused. Blocked or unknown requesters get 403.
pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<NewDonationRequest>,
) -> Result<Json<InsertResult>, ApiError> {
    let requester = state
        .actor(&claims)
        .await
        .map_err(|e| match e {
            ApiError::Forbidden(_) => ApiError::Forbidden(BLOCKED),
            other => other,
        })?;
    if !policy::can_create_request(&requester) {
        warn!("Blocked user {} tried to create a donation request", requester.email);
        return Err(ApiError::Forbidden(BLOCKED));
    }
    if let Some(email) = req.requester_email.as_deref() {
        if email != requester.email {
            return Err(ApiError::Forbidden(FORBIDDEN));
        }
    }

    let id = Uuid::new_v4().to_string();
    let owner = requester.email.clone();
    let created = state
        .run(move |db| db.insert_request(&id, &owner, &req))
        .await
        .or_internal("Server error")?;

    info!("Donation request {} created by {}", created.id, created.requester_email);
    Ok(Json(InsertResult::new(created.id)))
}

/// GET /requests/recent. The caller's three newest requests.
pub async fn recent_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    let email = claims.email;
    let requests = state
        .run(move |db| db.list_recent_requests_for_owner(&email, RECENT_LIMIT))
        .await
        .or_internal("Failed to fetch donation requests")?;
    Ok(Json(requests))
}

/// GET /donation-requests?status=. The caller's requests. Unknown status
/// values are ignored rather than rejected.
pub async fn my_requests(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    let status = DonationStatus::parse_filter(query.status.as_deref());
    let email = claims.email;
    let requests = state
        .run(move |db| db.list_requests_for_owner(&email, status))
        .await
        .or_internal("Failed to fetch donation requests")?;
    Ok(Json(requests))
}

/// GET /all-donation-requests?status=. Admins and volunteers only.
pub async fn all_requests(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    let actor = state.actor(&claims).await?;
    if !policy::can_administer(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let status = DonationStatus::parse_filter(query.status.as_deref());
    let requests = state
        .run(move |db| db.list_requests(status))
        .await
        .or_internal("Failed to fetch donation requests")?;
    Ok(Json(requests))
}

/// GET /pending-donation-requests. Public board of open requests.
pub async fn pending_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    let requests = state
        .run(|db| db.list_requests(Some(DonationStatus::Pending)))
        .await
        .or_internal("Failed to fetch donation requests")?;
    Ok(Json(requests))
}

/// GET /donation-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<DonationRequest>, ApiError> {
    Ok(Json(load_request(&state, &id).await?))
}

/// PUT /donation-requests/{id}. Partial edit by the owner or staff.
/// Only pending requests are editable; others answer with zero matches.
pub async fn update_request(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(patch): ApiJson<DonationRequestPatch>,
) -> Result<Json<UpdateResult>, ApiError> {
    if patch.fields().is_empty() {
        return Err(ApiError::invalid("No fields to update"));
    }

    let request = load_request(&state, &id).await?;
    let actor = state.actor(&claims).await?;
    if !policy::can_modify_request(&actor, &request) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let changed = state
        .run(move |db| db.update_request(&id, &patch))
        .await
        .or_internal("Update failed")?;
    Ok(Json(UpdateResult::new(changed.matched, changed.modified)))
}

/// DELETE /donation-requests/{id}. Owner or admin.
pub async fn delete_request(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeleteResult>, ApiError> {
    let request = load_request(&state, &id).await?;
    let actor = state.actor(&claims).await?;
    if !policy::can_delete_request(&actor, &request) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let removed = state
        .run(move |db| db.delete_request(&id))
        .await
        .or_internal("Delete failed")?;

    if removed {
        info!("Donation request {} deleted by {}", request.id, actor.email);
    }
    Ok(Json(DeleteResult::new(usize::from(removed))))
}

/// PUT /requests/{id}/status. Close an in-progress request as done or
/// canceled. Any other current status leaves the record untouched and
/// answers `{success: false}`.
pub async fn close_request(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<TransitionRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let to = req
        .closing_status()
        .ok_or_else(|| ApiError::invalid("Invalid status update"))?;

    let request = load_request(&state, &id).await?;
    let actor = state.actor(&claims).await?;
    if !policy::can_modify_request(&actor, &request) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let moved = state
        .run(move |db| db.transition_request(&id, DonationStatus::InProgress, to))
        .await
        .or_internal("Error updating status")?;

    if moved {
        info!("Donation request {} marked {} by {}", request.id, to, actor.email);
    }
    Ok(Json(SuccessResponse::new(moved)))
}

/// PUT /donation-requests/{id}/status. Staff move along any edge of the
/// lifecycle, guarded on the status read at request time. Starting a pending
/// request records the acting staff member as its donor, so an in-progress
/// request always names one.
pub async fn set_request_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<StatusChange>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let to: DonationStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::invalid("Invalid status"))?;

    let actor = state.actor(&claims).await?;
    if !policy::can_administer(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let request = load_request(&state, &id).await?;
    let from = request.donation_status;
    if !from.can_transition_to(to) {
        return Ok(Json(SuccessResponse::new(false)));
    }

    let donor_name = actor.name.clone();
    let donor_email = actor.email.clone();
    let moved = state
        .run(move |db| match (from, to) {
            (DonationStatus::Pending, DonationStatus::InProgress) => {
                db.start_donation(&id, donor_name.as_deref(), &donor_email)
            }
            _ => db.transition_request(&id, from, to),
        })
        .await
        .or_internal("Error updating status")?;

    if moved {
        info!("Donation request {} moved {} -> {} by {}", request.id, from, to, actor.email);
    }
    Ok(Json(SuccessResponse::new(moved)))
}

/// PUT /donation-requests/{id}/donate. The caller takes on a pending
/// request, moving it into progress.
pub async fn donate(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<DonateRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request = load_request(&state, &id).await?;
    let actor = state.actor(&claims).await?;
    if !policy::can_donate(&actor, &request) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let donor_name = req.donor_name.or_else(|| actor.name.clone());
    let donor_email = actor.email.clone();
    let started = state
        .run(move |db| db.start_donation(&id, donor_name.as_deref(), &donor_email))
        .await
        .or_internal("Error updating status")?;

    if started {
        info!("{} is donating for request {}", actor.email, request.id);
    }
    Ok(Json(SuccessResponse::new(started)))
}
