// rest_api/src/config.rs

use std::env;

use anyhow::{Context, Result};
use tracing::warn;

/// Fallback development signing key; set `JWT_SECRET` for any real
/// deployment.
const DEV_JWT_SECRET: &str = "dev-only-jwt-secret-change-me-0123456789";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_DATABASE_PATH: &str = "records.db";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

/// Loads the server configuration from the process environment (populated
/// from `.env` by the binary before this runs).
pub fn load_api_config() -> Result<ApiConfig> {
    let host = env::var("API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = parse_env("API_PORT", DEFAULT_PORT)?;
    let database_path =
        env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

    let jwt_secret = match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            warn!("JWT_SECRET is not set, using the built-in development key");
            DEV_JWT_SECRET.to_string()
        }
    };

    let access_ttl_secs = parse_env("ACCESS_TOKEN_TTL_SECS", security::DEFAULT_ACCESS_TTL_SECS)?;
    let refresh_ttl_secs = parse_env("REFRESH_TOKEN_TTL_SECS", security::DEFAULT_REFRESH_TTL_SECS)?;

    Ok(ApiConfig {
        host,
        port,
        database_path,
        jwt_secret,
        access_ttl_secs,
        refresh_ttl_secs,
    })
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .context(format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}
