//! High-level build entry point
//!
//! Ties the pieces together for callers that want the whole pipeline:
//! load the manifest, select the strategy, build, optionally publish,
//! persist. The manifest is written back exactly once, only after every
//! phase succeeded.

use std::path::PathBuf;
use std::sync::Arc;

use actpack_config::BuilderConfig;
use actpack_errors::Result;
use actpack_manifest::Manifest;
use tracing::info;

use crate::exec::CommandRunner;
use crate::strategy::create_strategy;

/// One action build
#[derive(Clone)]
pub struct BuildRequest {
    /// Directory containing the action manifest and sources.
    pub workdir: PathBuf,
    /// Configuration consumed by the strategies.
    pub config: BuilderConfig,
    /// Whether to run the publish phase after a successful build.
    pub publish: bool,
}

/// Run the full build pipeline for the action in `request.workdir`.
///
/// Returns the rewritten manifest after persisting it over the original
/// file.
///
/// # Errors
///
/// Propagates every pipeline error; on failure the manifest file is left
/// untouched.
pub async fn build_action(
    request: BuildRequest,
    runner: Arc<dyn CommandRunner>,
) -> Result<Manifest> {
    let (manifest, manifest_path) = Manifest::load(&request.workdir).await?;
    info!(
        action = %manifest.name,
        kind = ?manifest.kind(),
        "building action"
    );

    let mut strategy = create_strategy(manifest, request.config, request.workdir, runner);
    strategy.build().await?;
    if request.publish {
        strategy.publish().await?;
    }

    let manifest = strategy.into_manifest();
    manifest.save(&manifest_path)?;
    Ok(manifest)
}
