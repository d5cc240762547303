//! ncc bundling step
//!
//! Bundles an entrypoint and its dependencies into one self-contained
//! file under `dist/`, keyed by the input path: `src/main.ts` becomes
//! `dist/src/main.ts/index.js`.

use async_trait::async_trait;
use std::sync::Arc;

use actpack_errors::Result;

use super::Compiler;
use crate::package_manager::PackageManager;

/// Root of the bundler's output tree; entrypoints already under it are
/// treated as built.
pub const DIST_PREFIX: &str = "dist/";

pub struct NccBundler {
    package_manager: Arc<dyn PackageManager>,
}

impl NccBundler {
    #[must_use]
    pub fn new(package_manager: Arc<dyn PackageManager>) -> Self {
        Self { package_manager }
    }

    fn out_dir(source_file: &str) -> String {
        format!("{DIST_PREFIX}{source_file}")
    }
}

#[async_trait]
impl Compiler for NccBundler {
    async fn compile(&self, source_file: &str) -> Result<String> {
        let out_dir = Self::out_dir(source_file);
        self.package_manager
            .run("ncc", &["build", "-o", &out_dir, source_file])
            .await?;
        Ok(format!("{out_dir}/index.js"))
    }
}
