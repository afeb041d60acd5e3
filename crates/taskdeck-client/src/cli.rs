use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use taskdeck_core::cli::KeyVal;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "Taskdeck: terminal client for the dashboard task list and inbox"
)]
pub struct ClientCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `client.endpoint`.
    #[arg(long = "endpoint", global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every task, newest first.
    List,
    /// Show one task in detail.
    Info { id: String },
    /// Create a task.
    Add {
        title: String,
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
        #[arg(long = "due", value_parser = parse_day)]
        due: Option<NaiveDate>,
    },
    /// Flip a task between open and completed.
    Toggle { id: String },
    Rename { id: String, title: String },
    Describe { id: String, text: String },
    /// Set a task's due date (YYYY-MM-DD).
    Due {
        id: String,
        #[arg(value_parser = parse_day)]
        date: NaiveDate,
    },
    #[command(alias = "delete")]
    Rm { id: String },
    /// Print the date picker for a task.
    Calendar {
        id: String,
        #[arg(long = "year")]
        year: Option<i32>,
        /// 1 to 12.
        #[arg(long = "month", value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// List inbox chats.
    Inbox,
    /// Send a message to a chat.
    Send { chat_id: u64, message: String },
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
