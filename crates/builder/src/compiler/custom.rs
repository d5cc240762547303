//! User-templated compiler
//!
//! Substitutes the entrypoint into a user-provided command template, runs
//! it through the package manager, and returns the rendered output path
//! without verifying its existence: the custom command's output
//! conventions are not known here, so verification is the caller's
//! responsibility.

use async_trait::async_trait;
use std::sync::Arc;

use actpack_errors::{Error, Result};

use super::{render_entry, Compiler};
use crate::package_manager::PackageManager;

pub struct CustomCompiler {
    package_manager: Arc<dyn PackageManager>,
    command_template: String,
    output_template: String,
}

impl CustomCompiler {
    #[must_use]
    pub fn new(
        package_manager: Arc<dyn PackageManager>,
        command_template: String,
        output_template: String,
    ) -> Self {
        Self {
            package_manager,
            command_template,
            output_template,
        }
    }
}

#[async_trait]
impl Compiler for CustomCompiler {
    async fn compile(&self, source_file: &str) -> Result<String> {
        let command_line = render_entry(&self.command_template, source_file);

        // The template is whitespace-split, not shell-parsed.
        let mut parts = command_line.split_whitespace();
        let command = parts
            .next()
            .ok_or_else(|| Error::internal("custom build command template is empty"))?;
        let args: Vec<&str> = parts.collect();

        self.package_manager.run(command, &args).await?;
        Ok(render_entry(&self.output_template, source_file))
    }
}
