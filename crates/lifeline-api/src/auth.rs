use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;

use lifeline_types::api::{Claims, SuccessResponse, TokenRequest};

use crate::error::{ApiError, ResultExt};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Name of the HTTP-only cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

const TOKEN_TTL_DAYS: i64 = 365;

/// POST /jwt. Sign a session token for the posted identity and set it as a cookie.
pub async fn issue(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<TokenRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), ApiError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::invalid("Email is required"));
    }

    let token = create_token(&state.jwt_secret, email).or_internal("Failed to issue token")?;
    info!("Issued session token for {}", email);

    let jar = jar.add(session_cookie(&state, token));
    Ok((jar, Json(SuccessResponse::new(true))))
}

/// GET /logout. Clear the session cookie.
///
/// Tokens are stateless: a copy of the token replayed directly stays valid
/// until it expires.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    let mut cookie = session_cookie(&state, String::new());
    cookie.make_removal();
    (jar.add(cookie), Json(SuccessResponse::new(true)))
}

pub fn create_token(secret: &str, email: &str) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        email: email.trim().to_string(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    let same_site = if state.secure_cookies { SameSite::None } else { SameSite::Strict };
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(same_site)
        .build()
}
