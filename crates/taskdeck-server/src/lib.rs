pub mod cli;
pub mod error;
pub mod routes;
pub mod state;

use std::ffi::OsString;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use chrono::Utc;
use clap::Parser;
use taskdeck_core::config::Config;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub use error::ApiError;
pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(routes::healthz))
        .route(
            "/api/tasks",
            get(routes::tasks_list)
                .post(routes::task_add)
                .put(routes::task_update)
                .delete(routes::task_delete),
        )
        .route(
            "/api/inbox",
            get(routes::inbox_list).post(routes::inbox_send),
        )
        .with_state(state)
}

#[tracing::instrument(skip_all)]
pub async fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::ServerCli::parse_from(raw_args);

    taskdeck_core::cli::init_tracing(cli.verbose, cli.quiet)?;
    info!(verbose = cli.verbose, quiet = cli.quiet, "starting taskdeck server");

    let mut cfg = Config::load(cli.config.as_deref())?;
    cfg.apply_overrides(cli.rc_overrides.into_iter().map(Into::into));
    debug!(files = ?cfg.loaded_files, "configuration resolved");

    let addr = match cli.bind {
        Some(addr) => addr,
        None => cfg.bind_addr()?,
    };
    let timezone = cfg.timezone()?;

    let state = if cfg.seed_enabled() && !cli.no_seed {
        AppState::seeded(Utc::now(), timezone)
    } else {
        info!("starting with an empty task list");
        AppState::empty()
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    serve(listener, state, shutdown_signal()).await
}

/// Serves `state` on `listener` until `shutdown` resolves. The stores are
/// dropped when this returns.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no address")?;
    info!(addr = %addr, "taskdeck server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server loop failed")?;

    info!("server stopped; in-memory tasks discarded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
