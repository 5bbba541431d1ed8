use std::sync::Arc;

use anyhow::anyhow;

use lifeline_db::Database;
use lifeline_types::api::Claims;
use lifeline_types::models::User;

use crate::error::{ApiError, FORBIDDEN, ResultExt};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub jwt_secret: String,
    /// Production cookie policy: `Secure` and `SameSite=None`.
    pub secure_cookies: bool,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>, secure_cookies: bool) -> AppState {
        Arc::new(Self {
            db: Arc::new(db),
            jwt_secret: jwt_secret.into(),
            secure_cookies,
        })
    }

    /// Run a store call on the blocking pool so SQLite never stalls an
    /// async worker.
    pub async fn run<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| anyhow!("spawn_blocking join error: {}", e))?
    }

    /// Resolve the user record behind a session. A token for an email with
    /// no user record is not allowed to do anything role-gated.
    pub async fn actor(&self, claims: &Claims) -> Result<User, ApiError> {
        let email = claims.email.clone();
        self.run(move |db| db.get_user_by_email(&email))
            .await
            .or_internal("Failed to resolve user")?
            .ok_or(ApiError::Forbidden(FORBIDDEN))
    }
}
