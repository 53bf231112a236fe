mod api;
mod app;
mod auth;
mod clock;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod repositories;
mod routes;
mod services;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::sync::Arc;

use clock::SystemClock;
use repositories::{PgAppointmentsRepository, PgNotificationsRepository};
use services::RedisCache;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env)?;

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        office_open = settings.office_hours.open_hour,
        office_close = settings.office_hours.close_hour,
        utc_offset = %settings.office_hours.utc_offset,
        "Starting appointments backend"
    );

    let pool = db::create_pool(&settings).await?;

    let cache = RedisCache::new(&settings.redis_url, settings.redis_cache_ttl_seconds).await?;
    tracing::info!("Redis cache initialized");

    let state = app::AppState::new(
        settings.clone(),
        Arc::new(PgAppointmentsRepository::new(pool.clone())),
        Arc::new(PgNotificationsRepository::new(pool)),
        Arc::new(cache),
        Arc::new(SystemClock),
    );

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
