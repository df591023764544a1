use crate::api::DEFAULT_API_URL;
use clap::Parser;
use std::path::PathBuf;

/// Terminal client for a remote todo list.
#[derive(Debug, Parser)]
#[command(name = "remote-todo", version)]
pub struct Cli {
    /// Base URL of the task API; requests go to `<url>/tasks`.
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Write logs to this file. Logging is off without it.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
