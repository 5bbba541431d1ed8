use axum::{
    Extension, Json,
    extract::{Query, State},
};
use tracing::info;
use uuid::Uuid;

use lifeline_types::api::{Claims, DeleteResult, InsertResult, NewBlog, StatusChange, StatusQuery, UpdateResult};
use lifeline_types::models::{Blog, BlogStatus};

use crate::error::{ApiError, FORBIDDEN, ResultExt};
use crate::extract::{ApiJson, IdPath};
use crate::policy;
use crate::state::AppState;

const BLOG_NOT_FOUND: &str = "Blog not found";

fn parse_status(raw: &str) -> Result<BlogStatus, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid("Invalid status"))
}

/// GET /blogs?status=. `all` or no value lists every blog.
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(parse_status(raw)?),
    };

    let blogs = state
        .run(move |db| db.list_blogs(status))
        .await
        .or_internal("Failed to fetch blogs")?;
    Ok(Json(blogs))
}

pub async fn get_blog(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Blog>, ApiError> {
    let blog = state
        .run(move |db| db.get_blog(&id))
        .await
        .or_internal("Failed to fetch blog")?
        .ok_or(ApiError::NotFound(BLOG_NOT_FOUND))?;
    Ok(Json(blog))
}

/// POST /blogs. Staff write drafts; publishing is a separate admin step.
pub async fn create_blog(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(blog): ApiJson<NewBlog>,
) -> Result<Json<InsertResult>, ApiError> {
    let actor = state.actor(&claims).await?;
    if !policy::can_administer(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }
    if blog.title.trim().is_empty() || blog.content.trim().is_empty() {
        return Err(ApiError::invalid("Title and content are required"));
    }

    let id = Uuid::new_v4().to_string();
    let created = state
        .run(move |db| db.insert_blog(&id, &blog))
        .await
        .or_internal("Failed to create blog")?;

    info!("Blog {} drafted by {}", created.id, actor.email);
    Ok(Json(InsertResult::new(created.id)))
}

/// PATCH /blogs/{id}/status. Publish or unpublish.
pub async fn set_blog_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<StatusChange>,
) -> Result<Json<UpdateResult>, ApiError> {
    let status = parse_status(&req.status)?;

    let actor = state.actor(&claims).await?;
    if !policy::can_moderate_blog(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let changed = state
        .run(move |db| db.set_blog_status(&id, status))
        .await
        .or_internal("Failed to update blog status")?;
    if changed.matched == 0 {
        return Err(ApiError::NotFound(BLOG_NOT_FOUND));
    }

    Ok(Json(UpdateResult::new(changed.matched, changed.modified)))
}

/// DELETE /blogs/{id}
pub async fn delete_blog(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeleteResult>, ApiError> {
    let actor = state.actor(&claims).await?;
    if !policy::can_moderate_blog(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let removed = state
        .run(move |db| db.delete_blog(&id))
        .await
        .or_internal("Failed to delete blog")?;
    if !removed {
        return Err(ApiError::NotFound(BLOG_NOT_FOUND));
    }

    Ok(Json(DeleteResult::new(1)))
}
