//! actpack - package an action repository into a distributable artifact
//!
//! Loads the action manifest from the working directory, runs the build
//! strategy matching its execution model, and writes the rewritten
//! manifest back once the pipeline succeeded.

mod cli;
mod error;

use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use actpack_builder::{build_action, BuildRequest, CommandRunner, ProcessRunner};
use actpack_config::BuilderConfig;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        error!("build failed: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    info!("starting actpack v{}", env!("CARGO_PKG_VERSION"));

    let workdir = match cli.workdir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let request = BuildRequest {
        workdir,
        config: BuilderConfig::from_env(),
        publish: cli.push,
    };
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());

    let manifest = build_action(request, runner).await?;
    info!(action = %manifest.name, "action packaged");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
