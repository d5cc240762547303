//! Script action build pipeline
//!
//! Installs the bundler, resolves the package manager and compiler once,
//! compiles every declared entrypoint, and rewrites the manifest slots to
//! the produced paths. Entrypoint compilations are independent and run
//! concurrently; the manifest is only mutated after all of them succeeded.

use async_trait::async_trait;
use futures::future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use actpack_config::BuilderConfig;
use actpack_errors::{BuildError, Error, Result};
use actpack_manifest::{Manifest, Runs, ScriptRuns};
use tracing::info;

use super::BuildStrategy;
use crate::compiler::{Compiler, CustomCompiler, DefaultBundler, DIST_PREFIX};
use crate::exec::CommandRunner;
use crate::package_manager::{detect, PackageManager};

/// Bundler package installed globally before compiling; npm treats a
/// repeated global install as a no-op, which keeps reruns cheap.
const NCC_PACKAGE: &str = "@zeit/ncc";

/// The three entrypoint slots of a script action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entrypoint {
    Pre,
    Main,
    Post,
}

impl Entrypoint {
    const ALL: [Self; 3] = [Self::Pre, Self::Main, Self::Post];

    fn name(self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Main => "main",
            Self::Post => "post",
        }
    }

    fn get(self, runs: &ScriptRuns) -> Option<&String> {
        match self {
            Self::Pre => runs.pre.as_ref(),
            Self::Main => runs.main.as_ref(),
            Self::Post => runs.post.as_ref(),
        }
    }

    fn set(self, runs: &mut ScriptRuns, value: String) {
        match self {
            Self::Pre => runs.pre = Some(value),
            Self::Main => runs.main = Some(value),
            Self::Post => runs.post = Some(value),
        }
    }
}

pub struct ScriptBuildStrategy {
    manifest: Manifest,
    config: BuilderConfig,
    workdir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    // Single-owner caches, resolved once per build.
    package_manager: OnceCell<Arc<dyn PackageManager>>,
    compiler: OnceCell<Arc<dyn Compiler>>,
}

impl ScriptBuildStrategy {
    #[must_use]
    pub fn new(
        manifest: Manifest,
        config: BuilderConfig,
        workdir: PathBuf,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            manifest,
            config,
            workdir,
            runner,
            package_manager: OnceCell::new(),
            compiler: OnceCell::new(),
        }
    }

    fn runs(&self) -> &ScriptRuns {
        match &self.manifest.runs {
            Runs::NodeScript(runs) => runs,
            Runs::Container(_) => unreachable!("script strategy holds a script manifest"),
        }
    }

    fn runs_mut(&mut self) -> &mut ScriptRuns {
        match &mut self.manifest.runs {
            Runs::NodeScript(runs) => runs,
            Runs::Container(_) => unreachable!("script strategy holds a script manifest"),
        }
    }

    async fn install_ncc_globally(&self) -> Result<()> {
        info!("installing {NCC_PACKAGE} globally");
        self.runner
            .run_checked("npm", &["install", "-g", NCC_PACKAGE], &self.workdir)
            .await?;
        Ok(())
    }

    async fn package_manager(&self) -> Result<Arc<dyn PackageManager>> {
        let manager = self
            .package_manager
            .get_or_try_init(|| async {
                detect(&self.workdir, Arc::clone(&self.runner)).map(Arc::from)
            })
            .await?;
        Ok(Arc::clone(manager))
    }

    /// Resolve the compiler once: the custom command when an override is
    /// configured, the default bundler chain otherwise.
    async fn compiler(&self) -> Result<Arc<dyn Compiler>> {
        let manager = self.package_manager().await?;
        let compiler = self
            .compiler
            .get_or_try_init(|| async move {
                let build_command = self.config.js_build_command(false)?;
                if build_command.is_empty() {
                    return Ok::<_, Error>(Arc::new(DefaultBundler::new(manager)) as Arc<dyn Compiler>);
                }

                let built_path = self.config.js_built_path(true)?;
                Ok(Arc::new(CustomCompiler::new(manager, build_command, built_path))
                    as Arc<dyn Compiler>)
            })
            .await?;
        Ok(Arc::clone(compiler))
    }

    /// Compile `pre`, `main`, and `post` concurrently and rewrite the
    /// manifest slots to the produced paths.
    ///
    /// The compilations are joined with wait-for-all semantics: a failure
    /// does not cancel invocations that already started, and the first
    /// failure in slot order is the one reported. No slot is rewritten
    /// unless every compilation succeeded.
    async fn build_all_entrypoints(&mut self) -> Result<()> {
        let compiler = self.compiler().await?;

        let mut jobs: Vec<(Entrypoint, String)> = Vec::new();
        for entry in Entrypoint::ALL {
            let Some(source) = entry.get(self.runs()) else {
                continue;
            };
            if source.starts_with(DIST_PREFIX) {
                info!(
                    "runs.{} already points under {DIST_PREFIX}, skipping compilation",
                    entry.name()
                );
                continue;
            }
            jobs.push((entry, source.clone()));
        }

        let results = future::join_all(jobs.into_iter().map(|(entry, source)| {
            let compiler = Arc::clone(&compiler);
            async move { (entry, compiler.compile(&source).await) }
        }))
        .await;

        let mut compiled = Vec::with_capacity(results.len());
        for (entry, result) in results {
            compiled.push((entry, result?));
        }
        for (entry, path) in compiled {
            entry.set(self.runs_mut(), path);
        }
        Ok(())
    }
}

#[async_trait]
impl BuildStrategy for ScriptBuildStrategy {
    async fn build(&mut self) -> Result<()> {
        self.install_ncc_globally().await?;

        let manager = self.package_manager().await?;
        manager.install_dependencies_if_absent().await?;

        // A script action without an executable main entrypoint cannot be
        // published; fail before spawning any compilation.
        if self.runs().main.is_none() {
            return Err(BuildError::MissingMainEntrypoint.into());
        }

        self.build_all_entrypoints().await
    }

    fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn into_manifest(self: Box<Self>) -> Manifest {
        self.manifest
    }
}
