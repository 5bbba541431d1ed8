use axum::{
    Extension, Json,
    extract::State,
};
use uuid::Uuid;

use lifeline_types::api::{Claims, ContactForm, InsertResult};
use lifeline_types::models::ContactMessage;

use crate::error::{ApiError, FORBIDDEN, ResultExt};
use crate::extract::ApiJson;
use crate::policy;
use crate::state::AppState;

fn required(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// POST /contact. Every field must be present and non-blank.
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<Json<InsertResult>, ApiError> {
    let (Some(name), Some(email), Some(contact), Some(message)) = (
        required(form.name),
        required(form.email),
        required(form.contact),
        required(form.message),
    ) else {
        return Err(ApiError::invalid("All fields are required"));
    };

    let id = Uuid::new_v4().to_string();
    let created = state
        .run(move |db| db.insert_contact(&id, &name, &email, &contact, &message))
        .await
        .or_internal("Failed to send message")?;

    Ok(Json(InsertResult::new(created.id)))
}

/// GET /contact. Admin inbox.
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    let actor = state.actor(&claims).await?;
    if !policy::can_manage_users(&actor) {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let messages = state
        .run(|db| db.list_contacts())
        .await
        .or_internal("Failed to fetch messages")?;
    Ok(Json(messages))
}
