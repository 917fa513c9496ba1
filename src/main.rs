use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quire::cli::{self, Cli};
use quire::config::AppConfig;
use quire::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();
    let config = AppConfig::from_env()?.with_api_url(args.api_url)?;
    tracing::debug!(api = %config.api_base_url, session_file = %config.session_file.display(), "starting");

    let state = AppState::from_config(&config)?;

    match cli::run(args.command, &state).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{}", cli::describe(&err));
            Ok(ExitCode::FAILURE)
        }
    }
}
