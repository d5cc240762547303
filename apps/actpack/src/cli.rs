//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;

/// actpack - package an action repository into a distributable artifact
#[derive(Parser)]
#[command(name = "actpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Package an action repository into a distributable artifact")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory containing the action manifest (defaults to the current
    /// directory)
    #[arg(long, value_name = "PATH")]
    pub workdir: Option<PathBuf>,

    /// Push the built container image after a successful build
    #[arg(long)]
    pub push: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
