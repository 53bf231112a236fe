//! Subscriber setup. `RUST_LOG` overrides the per-environment defaults.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "appointments_backend=debug,tower_http=debug,sqlx=warn,info",
        Environment::Staging => "appointments_backend=debug,tower_http=info,sqlx=warn,info",
        Environment::Prod => "appointments_backend=info,tower_http=info,warn",
    }
}

pub fn init_logging(env: &Environment) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(env)))
        .context("Invalid log filter")?;

    // File and line only in dev
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if matches!(env, Environment::Prod) {
        registry.with(fmt_layer.json()).try_init()
    } else {
        registry.with(fmt_layer.pretty()).try_init()
    };
    installed.context("Failed to install tracing subscriber")?;

    tracing::info!(env = ?env, "Logging initialized");
    Ok(())
}
