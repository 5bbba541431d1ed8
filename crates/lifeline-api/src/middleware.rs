use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::{TOKEN_COOKIE, verify_token};
use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the session token from the `token` cookie (or a bearer header),
/// validate it and expose the claims to handlers as an extension.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| bearer_token(req.headers()))
        .ok_or(ApiError::Unauthenticated)?;

    let claims = verify_token(&state.jwt_secret, &token).map_err(|e| {
        debug!("Rejected session token: {}", e);
        ApiError::InvalidCredential
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string)
}
