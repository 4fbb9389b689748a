use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use calibr_sync::app::{shutdown_signal, AppContext};
use calibr_sync::cli::{commands, Cli, Commands, ConfigAction, FetchArgs};
use calibr_sync::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("calibr_sync=info")))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli
        .command
        .unwrap_or_else(|| Commands::Fetch(FetchArgs::default()))
    {
        Commands::Fetch(args) => {
            args.apply(&mut config);
            let ctx = AppContext::new(config)?;

            let report = tokio::select! {
                report = commands::fetch(&ctx) => report?,
                _ = shutdown_signal() => {
                    warn!("Interrupted, stopping all workers");
                    anyhow::bail!("interrupted");
                }
            };

            if !report.is_complete() {
                anyhow::bail!(
                    "{} day(s) could not be fetched",
                    report.failed.len() + report.aborted
                );
            }
        }
        Commands::Dates(args) => {
            args.apply(&mut config);
            let ctx = AppContext::new(config)?;
            commands::list_dates(&ctx)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config_path(cli.config.as_deref())?,
            ConfigAction::Show => commands::show_config(&config)?,
        },
    }

    Ok(())
}
