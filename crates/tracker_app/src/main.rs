mod platform;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Follow crawl jobs on a running console from the terminal.
#[derive(Debug, Parser)]
#[command(name = "crawl-tracker", version, about)]
pub struct Cli {
    /// Configuration file (RON).
    #[arg(short, long, default_value = platform::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Console root, e.g. http://127.0.0.1:5000/
    #[arg(long)]
    pub base_url: Option<String>,

    /// Raw Cookie header carrying the login session.
    #[arg(long)]
    pub cookie: Option<String>,

    /// Log file path.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow one job until it finishes.
    Watch { job_id: u64 },
    /// Follow every running job.
    Dashboard,
    /// Show the export preview of a job.
    Preview { job_id: u64 },
    /// Delete a job and its crawled pages.
    Delete {
        job_id: u64,
        /// Name shown in the confirmation prompt.
        #[arg(long)]
        name: Option<String>,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Check create-job form values without submitting them.
    Check(FormArgs),
}

#[derive(Debug, Args)]
pub struct FormArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub url: String,
    #[arg(long, default_value = "20")]
    pub max_pages: String,
    #[arg(long, default_value = "2")]
    pub max_depth: String,
    #[arg(long, default_value = "0.5")]
    pub delay: String,
    /// Administrators are not bound by the per-job limits.
    #[arg(long)]
    pub admin: bool,
}

fn main() -> anyhow::Result<()> {
    platform::run_app(Cli::parse())
}
