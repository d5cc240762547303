//! npm package manager implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

use actpack_errors::Result;

use super::{load_package_json, PackageJson, PackageManager};
use crate::exec::CommandRunner;

pub struct Npm {
    project_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    package_json: OnceCell<PackageJson>,
}

impl Npm {
    #[must_use]
    pub fn new(project_dir: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            project_dir,
            runner,
            package_json: OnceCell::new(),
        }
    }
}

#[async_trait]
impl PackageManager for Npm {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn lockfile(&self) -> &'static str {
        "package-lock.json"
    }

    fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    fn run_prefix(&self) -> &'static [&'static str] {
        &["npx"]
    }

    async fn install_dependencies(&self) -> Result<()> {
        self.runner
            .run_checked("npm", &["ci"], &self.project_dir)
            .await?;
        Ok(())
    }

    async fn package_json(&self) -> Result<PackageJson> {
        self.package_json
            .get_or_try_init(|| load_package_json(&self.project_dir))
            .await
            .cloned()
    }
}
