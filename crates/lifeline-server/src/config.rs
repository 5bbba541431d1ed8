use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// Placeholder JWT secrets that MUST NOT be used in production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    /// `LIFELINE_ENV=production`: secure cookies, no placeholder secrets.
    pub production: bool,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let production = var("LIFELINE_ENV").is_some_and(|v| v == "production");

        let jwt_secret = var("LIFELINE_JWT_SECRET").unwrap_or_else(|| "dev-secret-change-me".into());
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) || jwt_secret.is_empty() {
            if production {
                bail!("LIFELINE_JWT_SECRET is unset or still a placeholder");
            }
            warn!("LIFELINE_JWT_SECRET is unset or a placeholder; do not use this in production");
        }

        let cors_origins = var("LIFELINE_CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: var("LIFELINE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("LIFELINE_PORT", 3000)?,
            db_path: var("LIFELINE_DB_PATH").unwrap_or_else(|| "lifeline.db".into()).into(),
            jwt_secret,
            production,
            cors_origins,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw.parse().with_context(|| format!("Invalid {key} value '{raw}'")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
