pub mod api;
pub mod board;
pub mod bookmarks;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod controller;
pub mod due;
pub mod popover;
pub mod render;
pub mod view_config;

use std::ffi::OsString;

use clap::Parser;
use taskdeck_core::config::Config;
use tracing::{debug, info};

pub use api::{ApiError, HttpTaskApi, TaskApi};
pub use board::{SyncReport, TaskBoard};
pub use controller::{TaskCall, TaskController, TaskViewState};
pub use view_config::TaskRowConfig;

#[tracing::instrument(skip_all)]
pub async fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let cli = cli::ClientCli::parse_from(raw_args);

    taskdeck_core::cli::init_tracing(cli.verbose, cli.quiet)?;
    info!(verbose = cli.verbose, quiet = cli.quiet, "starting taskdeck client");

    let mut cfg = Config::load(cli.config.as_deref())?;
    cfg.apply_overrides(cli.rc_overrides.into_iter().map(Into::into));
    debug!(files = ?cfg.loaded_files, "configuration resolved");

    let endpoint = cli.endpoint.unwrap_or_else(|| cfg.endpoint());
    let api = HttpTaskApi::new(endpoint);
    debug!(endpoint = api.endpoint(), "using task service");

    let row_config = TaskRowConfig::from_config(&cfg)?;
    let renderer = render::Renderer::new(cfg.color_enabled());
    let mut board = TaskBoard::new(row_config);

    commands::dispatch(&api, &mut board, &renderer, cli.command).await
}
