#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Builder configuration for actpack
//!
//! The build strategies consume configuration through a set of named
//! getters. Each getter takes a `required` flag: a required value that is
//! absent fails with [`ConfigError::MissingRequired`], an optional one
//! resolves to the empty string, matching the action-input convention the
//! values come from.

use actpack_errors::{ConfigError, Result};
use tracing::debug;

/// Environment variable names the configuration loads from, following the
/// `INPUT_<NAME>` convention used for action inputs.
const ENV_JS_BUILD_COMMAND: &str = "INPUT_JS_BUILD_COMMAND";
const ENV_JS_BUILT_PATH: &str = "INPUT_JS_BUILT_PATH";
const ENV_DOCKER_REPOTAG: &str = "INPUT_DOCKER_REPOTAG";
const ENV_DOCKER_REGISTRY: &str = "INPUT_DOCKER_REGISTRY";
const ENV_DOCKER_USER: &str = "INPUT_DOCKER_USER";
const ENV_DOCKER_TOKEN: &str = "INPUT_DOCKER_TOKEN";
const ENV_DOCKER_BUILD_COMMAND: &str = "INPUT_DOCKER_BUILD_COMMAND";

/// Configuration surface consumed by the build strategies.
#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    js_build_command: Option<String>,
    js_built_path: Option<String>,
    image_repo_tag: Option<String>,
    docker_registry: Option<String>,
    docker_login_user: Option<String>,
    docker_login_token: Option<String>,
    docker_build_command: Option<String>,
}

impl BuilderConfig {
    /// Load configuration from `INPUT_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self {
            js_build_command: read_env(ENV_JS_BUILD_COMMAND),
            js_built_path: read_env(ENV_JS_BUILT_PATH),
            image_repo_tag: read_env(ENV_DOCKER_REPOTAG),
            docker_registry: read_env(ENV_DOCKER_REGISTRY),
            docker_login_user: read_env(ENV_DOCKER_USER),
            docker_login_token: read_env(ENV_DOCKER_TOKEN),
            docker_build_command: read_env(ENV_DOCKER_BUILD_COMMAND),
        };
        debug!(
            js_build_command = config.js_build_command.is_some(),
            image_repo_tag = config.image_repo_tag.is_some(),
            docker_registry = config.docker_registry.is_some(),
            "loaded builder configuration from environment"
        );
        config
    }

    /// Custom build command overriding the default bundler chain.
    pub fn js_build_command(&self, required: bool) -> Result<String> {
        get(&self.js_build_command, ENV_JS_BUILD_COMMAND, required)
    }

    /// Output-path template paired with the custom build command.
    pub fn js_built_path(&self, required: bool) -> Result<String> {
        get(&self.js_built_path, ENV_JS_BUILT_PATH, required)
    }

    /// Repository/tag for the container image build.
    pub fn image_repo_tag(&self, required: bool) -> Result<String> {
        get(&self.image_repo_tag, ENV_DOCKER_REPOTAG, required)
    }

    /// Registry host to log in to before pushing.
    pub fn docker_registry(&self, required: bool) -> Result<String> {
        get(&self.docker_registry, ENV_DOCKER_REGISTRY, required)
    }

    /// Registry login user.
    pub fn docker_login_user(&self, required: bool) -> Result<String> {
        get(&self.docker_login_user, ENV_DOCKER_USER, required)
    }

    /// Registry login token.
    pub fn docker_login_token(&self, required: bool) -> Result<String> {
        get(&self.docker_login_token, ENV_DOCKER_TOKEN, required)
    }

    /// Image-build command template; `{repotag}` is substituted.
    pub fn docker_build_command(&self, required: bool) -> Result<String> {
        get(&self.docker_build_command, ENV_DOCKER_BUILD_COMMAND, required)
    }

    #[must_use]
    pub fn with_js_build_command(mut self, value: impl Into<String>) -> Self {
        self.js_build_command = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_js_built_path(mut self, value: impl Into<String>) -> Self {
        self.js_built_path = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_image_repo_tag(mut self, value: impl Into<String>) -> Self {
        self.image_repo_tag = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_docker_registry(mut self, value: impl Into<String>) -> Self {
        self.docker_registry = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_docker_login_user(mut self, value: impl Into<String>) -> Self {
        self.docker_login_user = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_docker_login_token(mut self, value: impl Into<String>) -> Self {
        self.docker_login_token = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_docker_build_command(mut self, value: impl Into<String>) -> Self {
        self.docker_build_command = Some(value.into());
        self
    }
}

fn read_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

fn get(value: &Option<String>, key: &str, required: bool) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ if required => Err(ConfigError::MissingRequired {
            key: key.to_string(),
        }
        .into()),
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_absent_resolves_to_empty() {
        let config = BuilderConfig::default();
        assert_eq!(config.docker_registry(false).unwrap(), "");
    }

    #[test]
    fn required_absent_fails() {
        let config = BuilderConfig::default();
        let err = config.image_repo_tag(true).unwrap_err();
        assert!(matches!(
            err,
            actpack_errors::Error::Config(ConfigError::MissingRequired { .. })
        ));
    }

    #[test]
    fn present_value_is_returned_regardless_of_required() {
        let config = BuilderConfig::default().with_image_repo_tag("org/app:v1");
        assert_eq!(config.image_repo_tag(true).unwrap(), "org/app:v1");
        assert_eq!(config.image_repo_tag(false).unwrap(), "org/app:v1");
    }
}
