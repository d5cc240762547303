//! yarn package manager implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

use actpack_errors::Result;

use super::{load_package_json, PackageJson, PackageManager};
use crate::exec::CommandRunner;

pub struct Yarn {
    project_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    package_json: OnceCell<PackageJson>,
}

impl Yarn {
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
impl PackageManager for Yarn {
    fn name(&self) -> &'static str {
        "yarn"
    }

    fn lockfile(&self) -> &'static str {
        "yarn.lock"
    }

    fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    fn run_prefix(&self) -> &'static [&'static str] {
        &["yarn", "run"]
    }

    async fn install_dependencies(&self) -> Result<()> {
        self.runner
            .run_checked(
                "yarn",
                &["install", "--frozen-lockfile", "--non-interactive"],
                &self.project_dir,
            )
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
