//! Entry point for the Tukin Engine binary.
//!
//! Running this binary starts an HTTP server exposing the deduction
//! engine.  A JSON rules file may be supplied via `TUKIN_RULES_PATH`;
//! if unset the built-in rule table and caps are used.  The bind
//! address comes from `TUKIN_BIND_ADDR` and log filtering from
//! `RUST_LOG`.

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tukin_engine::config::load_config_from_env;
use tukin_engine::{api, TukinEngine};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        error!("Error running server: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Invalid configuration must stop startup before any report runs.
    let config = load_config_from_env().context("invalid tukin configuration")?;
    let engine = TukinEngine::new(config).context("invalid tukin configuration")?;
    info!(
        attendance_cap = %engine.config().caps.attendance_percent,
        other_cap = %engine.config().caps.other_percent,
        total_cap = %engine.config().caps.total_percent,
        "tukin engine configured"
    );
    let addr = std::env::var("TUKIN_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    api::serve(&addr, engine).await
}
