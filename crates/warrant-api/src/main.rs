//! Warrant server binary.
//!
//! Opens the license database, assembles the application state, and
//! serves the HTTP API. Operational knobs arrive as flags; secrets come
//! from the environment (`API_SECRET`, `ADMIN_USER`, `ADMIN_PASS`,
//! `WEBHOOK_URL`) via [`ServiceConfig::from_env`].
//!
//! Usage:
//!   warrant-server --port 3000 --db licenses.db

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warrant_api::{app, AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "warrant-server")]
#[command(about = "License validation and activation tracking authority")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Path to the SQLite database file
    #[arg(long, default_value = "licenses.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServiceConfig::from_env();
    if config.webhook_url.is_some() {
        info!("webhook notifications enabled");
    }

    let pool = warrant_state::db::open(&args.db)
        .await
        .with_context(|| format!("open database at {}", args.db.display()))?;
    let state = AppState::new(pool, config);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", args.bind, args.port))
        .await
        .with_context(|| format!("bind {}:{}", args.bind, args.port))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server terminated")?;

    Ok(())
}
