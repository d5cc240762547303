//! Default compiler chain
//!
//! Optional transpile, then bundling. The transpile step runs only when
//! the project declares `ttypescript`; the check goes through the package
//! manager's cached `package.json`, so the dependency manifest is read
//! once per build no matter how many entrypoints compile.

use async_trait::async_trait;
use std::sync::Arc;

use actpack_errors::Result;
use tracing::debug;

use super::{Compiler, NccBundler, TtscTranspiler};
use crate::package_manager::PackageManager;

pub struct DefaultBundler {
    package_manager: Arc<dyn PackageManager>,
}

impl DefaultBundler {
    #[must_use]
    pub fn new(package_manager: Arc<dyn PackageManager>) -> Self {
        Self { package_manager }
    }

    async fn transpile_if_ttsc_is_used(&self, source_file: &str) -> Result<String> {
        if self.package_manager.uses_ttsc().await? {
            debug!(source = source_file, "ttypescript declared, transpiling before bundling");
            return TtscTranspiler::new(Arc::clone(&self.package_manager))
                .compile(source_file)
                .await;
        }
        Ok(source_file.to_string())
    }
}

#[async_trait]
impl Compiler for DefaultBundler {
    async fn compile(&self, source_file: &str) -> Result<String> {
        let ncc_ready = self.transpile_if_ttsc_is_used(source_file).await?;
        NccBundler::new(Arc::clone(&self.package_manager))
            .compile(&ncc_ready)
            .await
    }
}
