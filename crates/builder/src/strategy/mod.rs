//! Build strategies and strategy selection
//!
//! A strategy owns the manifest for the duration of a build, runs its
//! pipeline, and leaves the manifest mutated to reference the produced
//! artifacts. Selection happens exactly once, here, from the manifest's
//! discriminator; downstream code never re-inspects the variant.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use actpack_config::BuilderConfig;
use actpack_errors::Result;
use actpack_manifest::{ActionKind, Manifest};

mod container;
mod script;

pub use container::ContainerBuildStrategy;
pub use script::ScriptBuildStrategy;

use crate::exec::CommandRunner;

/// Trait for build strategy implementations
#[async_trait]
pub trait BuildStrategy: Send {
    /// Run the build pipeline, mutating the owned manifest in place.
    async fn build(&mut self) -> Result<()>;

    /// Publish built artifacts. The push phase may be invoked separately
    /// from the build; strategies without a publish step do nothing.
    async fn publish(&mut self) -> Result<()> {
        Ok(())
    }

    fn manifest(&self) -> &Manifest;

    /// Hand the (possibly mutated) manifest back for persistence.
    fn into_manifest(self: Box<Self>) -> Manifest;
}

/// Instantiate the strategy matching the manifest's execution model.
///
/// Pure classification: unknown discriminators never reach this point
/// because `Manifest::load` already rejects them.
#[must_use]
pub fn create_strategy(
    manifest: Manifest,
    config: BuilderConfig,
    workdir: PathBuf,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn BuildStrategy> {
    match manifest.kind() {
        ActionKind::Script => Box::new(ScriptBuildStrategy::new(manifest, config, workdir, runner)),
        ActionKind::Container => Box::new(ContainerBuildStrategy::new(
            manifest, config, workdir, runner,
        )),
    }
}
