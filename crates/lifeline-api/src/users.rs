use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::info;

use lifeline_db::users::LoginOutcome;
use lifeline_types::api::{
    Claims, DonorSearchQuery, DonorSearchResult, InsertResult, LoginProfile, ProfileUpdate,
    RoleChange, RoleResponse, StatusChange, StatusQuery, UpdateResult, UsersResponse,
};
use lifeline_types::districts::{self, District};
use lifeline_types::models::{Role, User, UserStatus};

use crate::error::{ApiError, FORBIDDEN, ResultExt};
use crate::extract::{ApiJson, IdPath};
use crate::policy;
use crate::state::AppState;

const USER_NOT_FOUND: &str = "User Not Found";

/// POST /user. Record a login. First login creates an active donor;
/// later logins only refresh `last_login`.
pub async fn save_user(
    State(state): State<AppState>,
    ApiJson(profile): ApiJson<LoginProfile>,
) -> Result<Response, ApiError> {
    if profile.email.trim().is_empty() {
        return Err(ApiError::invalid("Email is required"));
    }

    let email = profile.email.trim().to_string();
    let outcome = state
        .run(move |db| db.upsert_login(&profile))
        .await
        .or_internal("Failed to save user")?;

    Ok(match outcome {
        LoginOutcome::Created(id) => {
            info!("Created user {} for {}", id, email);
            Json(InsertResult::new(id)).into_response()
        }
        LoginOutcome::Updated(changed) => {
            info!("Refreshed last login for {}", email);
            Json(UpdateResult::new(changed.matched, changed.modified)).into_response()
        }
    })
}

/// GET /users/role/{email}
pub async fn get_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = state
        .run(move |db| db.find_role(email.trim()))
        .await
        .or_internal("Failed to fetch user role")?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(RoleResponse { role }))
}

/// GET /users?status=. Admin listing. `all` or no value means unfiltered.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UsersResponse>, ApiError> {
    let actor = state.actor(&claims).await?;
    if !policy::can_manage_users(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<UserStatus>()
                .map_err(|_| ApiError::invalid("Invalid status"))?,
        ),
    };

    let users = state
        .run(move |db| db.list_users(status))
        .await
        .or_internal("Failed to fetch users")?;

    Ok(Json(UsersResponse { users }))
}

/// PATCH /users/{id}/status. Block or unblock a user.
pub async fn set_user_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<StatusChange>,
) -> Result<Json<UpdateResult>, ApiError> {
    let status: UserStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::invalid("Invalid status"))?;

    let actor = state.actor(&claims).await?;
    if !policy::can_manage_users(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let target = id.clone();
    let changed = state
        .run(move |db| db.set_user_status(&target, status))
        .await
        .or_internal("Failed to update user status")?;
    if changed.matched == 0 {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    info!("{} set status of user {} to {}", actor.email, id, status);
    Ok(Json(UpdateResult::new(changed.matched, changed.modified)))
}

/// PATCH /users/{id}/role. Promote a user to volunteer or admin.
pub async fn set_user_role(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<RoleChange>,
) -> Result<Json<UpdateResult>, ApiError> {
    let role = req
        .role
        .parse::<Role>()
        .ok()
        .filter(|r| r.is_assignable())
        .ok_or_else(|| ApiError::invalid("Invalid role"))?;

    let actor = state.actor(&claims).await?;
    if !policy::can_manage_users(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let target = id.clone();
    let changed = state
        .run(move |db| db.set_user_role(&target, role))
        .await
        .or_internal("Failed to update user role")?;
    if changed.matched == 0 {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    info!("{} set role of user {} to {}", actor.email, id, role);
    Ok(Json(UpdateResult::new(changed.matched, changed.modified)))
}

/// GET /profile. The caller's own user record.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, ApiError> {
    let email = claims.email;
    let user = state
        .run(move |db| db.get_user_by_email(&email))
        .await
        .or_internal("Failed to fetch profile")?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(user))
}

/// PATCH /profile. Edit the caller's public profile fields.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<UpdateResult>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::invalid("No fields to update"));
    }

    let email = claims.email;
    let changed = state
        .run(move |db| db.update_profile(&email, &update))
        .await
        .or_internal("Failed to update profile")?;
    if changed.matched == 0 {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    Ok(Json(UpdateResult::new(changed.matched, changed.modified)))
}

/// GET /search-donors?bloodGroup=&district=&upazila=
pub async fn search_donors(
    State(state): State<AppState>,
    Query(query): Query<DonorSearchQuery>,
) -> Result<Json<Vec<DonorSearchResult>>, ApiError> {
    let required = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(blood_group), Some(district), Some(upazila)) = (
        required(query.blood_group),
        required(query.district),
        required(query.upazila),
    ) else {
        return Err(ApiError::invalid("bloodGroup, district and upazila are required"));
    };

    let donors = state
        .run(move |db| db.search_donors(&blood_group, &district, &upazila))
        .await
        .or_internal("Failed to search donors")?;

    let results = donors
        .into_iter()
        .map(|u| DonorSearchResult {
            district_name: u
                .district
                .as_deref()
                .and_then(districts::district_name)
                .map(str::to_string),
            id: u.id,
            name: u.name,
            email: u.email,
            avatar: u.avatar,
            blood_group: u.blood_group,
            district: u.district,
            upazila: u.upazila,
        })
        .collect();

    Ok(Json(results))
}

/// GET /districts
pub async fn list_districts() -> Json<&'static [District]> {
    Json(districts::all())
}
