//! Container action build pipeline
//!
//! Builds the image with a user-templated command, rewrites `runs.image`
//! to the resolved repo/tag, and on publish authenticates against the
//! configured registry (if any) before pushing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use actpack_config::BuilderConfig;
use actpack_errors::{BuildError, Result};
use actpack_manifest::{ContainerRuns, Manifest, Runs};
use tracing::info;

use super::BuildStrategy;
use crate::exec::{render_command, CommandRunner};

/// Placeholder substituted with the resolved repo/tag in the image-build
/// command template
const REPOTAG_PLACEHOLDER: &str = "{repotag}";

pub struct ContainerBuildStrategy {
    manifest: Manifest,
    config: BuilderConfig,
    workdir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl ContainerBuildStrategy {
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
        }
    }

    fn runs(&self) -> &ContainerRuns {
        match &self.manifest.runs {
            Runs::Container(runs) => runs,
            Runs::NodeScript(_) => unreachable!("container strategy holds a container manifest"),
        }
    }

    fn runs_mut(&mut self) -> &mut ContainerRuns {
        match &mut self.manifest.runs {
            Runs::Container(runs) => runs,
            Runs::NodeScript(_) => unreachable!("container strategy holds a container manifest"),
        }
    }

    async fn login_to_registry(&self) -> Result<()> {
        let registry = self.config.docker_registry(false)?;

        // No registry configured: the push targets whatever default
        // registry the host is already logged in to.
        if registry.is_empty() {
            info!("no registry configured, skipping docker login");
            return Ok(());
        }

        let user = self.config.docker_login_user(true)?;
        let token = self.config.docker_login_token(true)?;

        self.runner
            .run_checked(
                "docker",
                &["login", &registry, "-u", &user, "-p", &token],
                &self.workdir,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BuildStrategy for ContainerBuildStrategy {
    async fn build(&mut self) -> Result<()> {
        let Ok(repotag) = self.config.image_repo_tag(true) else {
            return Err(BuildError::MissingImageTag.into());
        };

        let template = self.config.docker_build_command(true)?;
        let command_line = template.replace(REPOTAG_PLACEHOLDER, &repotag);

        // The template is whitespace-split, not shell-parsed.
        let mut parts = command_line.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(BuildError::ImageBuildFailed {
                message: "image build command template is empty".to_string(),
            }
            .into());
        };
        let args: Vec<&str> = parts.collect();

        let result = self.runner.run(program, &args, &self.workdir).await?;
        if !result.success {
            return Err(BuildError::ImageBuildFailed {
                message: format!(
                    "`{}` exited with code {}: {}",
                    render_command(program, &args),
                    result.exit_code.unwrap_or(-1),
                    result.stderr.trim()
                ),
            }
            .into());
        }

        self.runs_mut().image = repotag;
        Ok(())
    }

    async fn publish(&mut self) -> Result<()> {
        self.login_to_registry().await?;

        let image = self.runs().image.clone();
        self.runner
            .run_checked("docker", &["push", &image], &self.workdir)
            .await?;
        Ok(())
    }

    fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn into_manifest(self: Box<Self>) -> Manifest {
        self.manifest
    }
}
