pub mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::domain::parse_date;
use crate::fetcher::ConcurrencyMode;

#[derive(Parser)]
#[command(name = "calibr-sync")]
#[command(about = "Download daily sensor calibration records as JSON files", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/calibr-sync/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every day of the range and write one file per day
    Fetch(FetchArgs),
    /// Print the days, URLs and target files without fetching
    Dates(FetchArgs),
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
}

/// Overrides applied on top of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct FetchArgs {
    /// First day to fetch (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_start)]
    pub start: Option<NaiveDate>,

    /// Number of consecutive days
    #[arg(short = 'n', long)]
    pub days: Option<usize>,

    /// Directory receiving YYYY-MM-DD.json files
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Endpoint root, days are read from {base_url}/day/YYYY-MM-DD
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(short, long, value_enum)]
    pub mode: Option<ConcurrencyMode>,

    /// Simultaneous workers in parallel mode (0 = one per day)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Attempts per day before giving up (0 = retry forever)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay before each retry in milliseconds
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Abort the whole run after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Stop retrying a day the server answers with 404
    #[arg(long)]
    pub stop_on_not_found: bool,

    /// Extra request header, e.g. "Accept: application/json" (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

impl FetchArgs {
    pub fn apply(&self, config: &mut Config) {
        let fetch = &mut config.fetch;
        if let Some(start) = self.start {
            fetch.start = start;
        }
        if let Some(days) = self.days {
            fetch.days = days;
        }
        if let Some(dir) = &self.out_dir {
            fetch.output_dir = dir.clone();
        }
        if let Some(url) = &self.base_url {
            fetch.base_url = url.clone();
        }
        if let Some(mode) = self.mode {
            fetch.mode = mode;
        }
        if let Some(workers) = self.workers {
            fetch.workers = workers;
        }
        if self.timeout_secs.is_some() {
            fetch.timeout_secs = self.timeout_secs;
        }
        if self.deadline_secs.is_some() {
            fetch.deadline_secs = self.deadline_secs;
        }

        let retry = &mut config.retry;
        if let Some(max) = self.max_attempts {
            retry.max_attempts = max;
        }
        if let Some(delay) = self.retry_delay_ms {
            retry.delay_ms = delay;
        }
        if self.stop_on_not_found {
            retry.stop_on_not_found = true;
        }

        for (name, value) in &self.headers {
            config.headers.insert(name.clone(), value.clone());
        }
    }
}

fn parse_start(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("Invalid header {:?}, expected NAME: VALUE", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid header {:?}, name is empty", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
