use std::path::Path;

use crate::app::{AppContext, Result};
use crate::config::{Config, ConfigError};
use crate::fetcher::RunReport;
use crate::store::Store;

pub async fn fetch(ctx: &AppContext) -> Result<RunReport> {
    let tasks = ctx.tasks();

    if tasks.is_empty() {
        println!("No days to fetch");
        return Ok(RunReport::default());
    }

    println!(
        "Fetching {} day(s) into {} ({})...",
        tasks.len(),
        ctx.store.dir().display(),
        ctx.coordinator.mode()
    );

    let report = ctx.coordinator.run(tasks).await?;

    for (date, outcome) in &report.saved {
        if outcome.attempts > 1 {
            println!("  {} saved after {} attempts", date, outcome.attempts);
        }
    }
    for (date, err) in &report.failed {
        eprintln!("  {} failed: {}", date, err);
    }

    println!(
        "Fetch complete: {} saved, {} failed, {} attempts",
        report.saved.len(),
        report.failed.len() + report.aborted,
        report.total_attempts()
    );

    Ok(report)
}

pub fn list_dates(ctx: &AppContext) -> Result<()> {
    let tasks = ctx.tasks();

    if tasks.is_empty() {
        println!("No days in range");
        return Ok(());
    }

    for task in tasks {
        let marker = if ctx.store.exists(task.file_name()) {
            "saved"
        } else {
            "     "
        };
        println!(
            "{} {}  {}\n  {}",
            marker,
            task.date(),
            ctx.store.path_for(task.file_name()).display(),
            task.remote_url()
        );
    }

    Ok(())
}

pub fn config_path(explicit: Option<&Path>) -> std::result::Result<(), ConfigError> {
    match explicit {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", Config::default_config_path()?.display()),
    }
    Ok(())
}

pub fn show_config(config: &Config) -> std::result::Result<(), ConfigError> {
    print!("{}", config.to_toml()?);
    Ok(())
}
