//! ttsc transpile step
//!
//! Transpiles an entrypoint into the `ttsc-dist/` intermediate directory
//! ahead of bundling. Only used when the project declares `ttypescript`.

use async_trait::async_trait;
use std::sync::Arc;

use actpack_errors::Result;

use super::Compiler;
use crate::package_manager::PackageManager;

const OUT_DIR: &str = "ttsc-dist";

pub struct TtscTranspiler {
    package_manager: Arc<dyn PackageManager>,
}

impl TtscTranspiler {
    #[must_use]
    pub fn new(package_manager: Arc<dyn PackageManager>) -> Self {
        Self { package_manager }
    }
}

#[async_trait]
impl Compiler for TtscTranspiler {
    async fn compile(&self, source_file: &str) -> Result<String> {
        self.package_manager
            .run("ttsc", &["--outDir", OUT_DIR, source_file])
            .await?;
        Ok(format!("{OUT_DIR}/{source_file}"))
    }
}
