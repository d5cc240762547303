//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error(
        "both package-lock.json and yarn.lock found in {dir}; dependencies are not installed \
         automatically to avoid building with upgraded packages unknowingly"
    )]
    DuplicateLockfiles { dir: String },

    #[error(
        "neither package-lock.json nor yarn.lock found in {dir}; dependencies are not installed \
         automatically to avoid building with upgraded packages unknowingly"
    )]
    NoLockfile { dir: String },

    #[error("runs.main is not defined; a script action cannot be published without it")]
    MissingMainEntrypoint,

    #[error("no image tag configured; a container action cannot be built without one")]
    MissingImageTag,

    #[error("image build failed: {message}")]
    ImageBuildFailed { message: String },

    #[error("command `{command}` failed with exit code {exit_code}")]
    SubprocessFailed { command: String, exit_code: i32 },

    #[error("failed to spawn `{command}`: {message}")]
    SpawnFailed { command: String, message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateLockfiles { .. } => {
                Some("Leave only one of the lockfiles, or run the install command manually first.")
            }
            Self::NoLockfile { .. } => {
                Some("Commit a lockfile, or run the install command manually first.")
            }
            Self::MissingMainEntrypoint => Some("Declare runs.main in the action manifest."),
            Self::MissingImageTag => Some("Set the image repo/tag input (INPUT_DOCKER_REPOTAG)."),
            Self::ImageBuildFailed { .. } => {
                Some("Check the image build command output for the underlying failure.")
            }
            Self::SubprocessFailed { .. } | Self::SpawnFailed { .. } => {
                Some("Check that the tool is installed and the command output for details.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DuplicateLockfiles { .. } => "build.duplicate_lockfiles",
            Self::NoLockfile { .. } => "build.no_lockfile",
            Self::MissingMainEntrypoint => "build.missing_main_entrypoint",
            Self::MissingImageTag => "build.missing_image_tag",
            Self::ImageBuildFailed { .. } => "build.image_build_failed",
            Self::SubprocessFailed { .. } => "build.subprocess_failed",
            Self::SpawnFailed { .. } => "build.spawn_failed",
        };
        Some(code)
    }
}
