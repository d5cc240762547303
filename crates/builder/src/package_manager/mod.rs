//! Package manager abstraction and implementations
//!
//! Detects which dependency-lock ecosystem a project uses and exposes a
//! uniform install/run capability. Detection is deliberately strict: a
//! project with both lockfiles, or with neither, is a hard error instead
//! of a silent default, so builds never run against an unintended
//! dependency resolution.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use actpack_errors::{BuildError, Error, Result};
use tracing::info;

use crate::exec::{CommandResult, CommandRunner};

mod npm;
mod yarn;

pub use npm::Npm;
pub use yarn::Yarn;

/// Directory that marks dependencies as already materialized
const INSTALLED_MODULES_DIR: &str = "node_modules";

/// The package the default compiler chain treats as the alternate
/// transpiler.
const TTSC_PACKAGE: &str = "ttypescript";

/// Relevant subset of `package.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
}

impl PackageJson {
    /// Whether `name` appears among direct or dev dependencies.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        let in_keys = |deps: &Option<BTreeMap<String, String>>| {
            deps.as_ref().is_some_and(|map| map.contains_key(name))
        };
        in_keys(&self.dependencies) || in_keys(&self.dev_dependencies)
    }
}

/// Trait for package manager implementations
#[async_trait]
pub trait PackageManager: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lockfile filename that selects this manager.
    fn lockfile(&self) -> &'static str;

    fn project_dir(&self) -> &Path;

    fn runner(&self) -> &Arc<dyn CommandRunner>;

    /// Invocation prefix that resolves binaries installed as local
    /// dependencies (`npx ...` / `yarn run ...`).
    fn run_prefix(&self) -> &'static [&'static str];

    /// Install exactly what the lockfile specifies.
    async fn install_dependencies(&self) -> Result<()>;

    /// Parsed `package.json`, cached for the life of the build.
    async fn package_json(&self) -> Result<PackageJson>;

    fn has_lockfile(&self) -> bool {
        self.project_dir().join(self.lockfile()).is_file()
    }

    /// Install dependencies unless they are already materialized.
    async fn install_dependencies_if_absent(&self) -> Result<()> {
        if self.project_dir().join(INSTALLED_MODULES_DIR).is_dir() {
            info!("{INSTALLED_MODULES_DIR} found, skipping dependency install");
            return Ok(());
        }
        self.install_dependencies().await
    }

    /// Run a command through the manager's invocation prefix in the
    /// project directory.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::SubprocessFailed` on a non-zero exit.
    async fn run(&self, command: &str, args: &[&str]) -> Result<CommandResult> {
        let prefix = self.run_prefix();
        let program = prefix[0];
        let mut full_args: Vec<&str> = prefix[1..].to_vec();
        full_args.push(command);
        full_args.extend_from_slice(args);
        self.runner()
            .run_checked(program, &full_args, self.project_dir())
            .await
    }

    /// Whether the project declares the alternate transpiler.
    async fn uses_ttsc(&self) -> Result<bool> {
        Ok(self.package_json().await?.declares(TTSC_PACKAGE))
    }
}

/// Select the package manager for `dir` from lockfile presence.
///
/// # Errors
///
/// Returns `BuildError::DuplicateLockfiles` when both lockfiles exist and
/// `BuildError::NoLockfile` when neither does.
pub fn detect(dir: &Path, runner: Arc<dyn CommandRunner>) -> Result<Box<dyn PackageManager>> {
    let npm = Npm::new(dir.to_path_buf(), Arc::clone(&runner));
    let yarn = Yarn::new(dir.to_path_buf(), runner);

    match (npm.has_lockfile(), yarn.has_lockfile()) {
        (true, true) => Err(BuildError::DuplicateLockfiles {
            dir: dir.display().to_string(),
        }
        .into()),
        (true, false) => Ok(Box::new(npm)),
        (false, true) => Ok(Box::new(yarn)),
        (false, false) => Err(BuildError::NoLockfile {
            dir: dir.display().to_string(),
        }
        .into()),
    }
}

/// Read and parse `package.json` from `dir`.
pub(crate) async fn load_package_json(dir: &Path) -> Result<PackageJson> {
    let path = dir.join("package.json");
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| Error::io_with_path(&e, &path))?;
    Ok(serde_json::from_str(&text)?)
}
