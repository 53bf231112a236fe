use anyhow::{bail, Context, Result};
use chrono::FixedOffset;
use std::env;
use std::str::FromStr;

use crate::domain::OfficeHours;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis
    pub redis_url: String,
    pub redis_cache_ttl_seconds: u64,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Auth
    pub jwt_secret: String,

    // Scheduling
    pub office_hours: OfficeHours,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3333".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;

        // Redis
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());
        let redis_cache_ttl_seconds = parse_or("REDIS_CACHE_TTL_SECONDS", 3600)?;

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        // Scheduling
        let office_hours = office_hours_from_env()?;

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            redis_url,
            redis_cache_ttl_seconds,
            cors_allow_origins,
            jwt_secret,
            office_hours,
        })
    }
}

/// `default` when `key` is unset, an error when it is set but unparseable.
fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(env::var(key)
        .ok()
        .map(|s| {
            s.trim()
                .parse()
                .with_context(|| format!("{key} has an invalid value: {s:?}"))
        })
        .transpose()?
        .unwrap_or(default))
}

fn office_hours_from_env() -> Result<OfficeHours> {
    office_hours_from_parts(
        parse_or("OFFICE_HOURS_OPEN", 8)?,
        parse_or("OFFICE_HOURS_CLOSE", 18)?,
        parse_or("OFFICE_UTC_OFFSET_MINUTES", 0)?,
    )
}

fn office_hours_from_parts(open: u32, close: u32, offset_minutes: i32) -> Result<OfficeHours> {
    if open >= close || close > 24 {
        bail!("office hours must satisfy OPEN < CLOSE <= 24, got {open}..{close}");
    }

    let utc_offset = offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("OFFICE_UTC_OFFSET_MINUTES out of range: {offset_minutes}"))?;

    Ok(OfficeHours::new(open, close, utc_offset))
}
