use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use taskdeck_core::cli::KeyVal;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck-server",
    version,
    about = "Taskdeck: in-memory task and inbox API for the dashboard"
)]
pub struct ServerCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Overrides `server.bind`.
    #[arg(long = "bind")]
    pub bind: Option<SocketAddr>,

    /// Start with an empty task list and inbox.
    #[arg(long = "no-seed")]
    pub no_seed: bool,
}
