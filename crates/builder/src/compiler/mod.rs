//! Compiler abstraction and implementations
//!
//! A compiler turns one source entrypoint into one output file path. Two
//! families exist: a user-templated custom command, and the default chain
//! of an optional transpile followed by bundling. Output paths follow a
//! fixed convention keyed by the input path, so recompiling the same file
//! yields the same path.

use async_trait::async_trait;

use actpack_errors::Result;

mod custom;
mod default_bundler;
mod ncc;
mod ttsc;

pub use custom::CustomCompiler;
pub use default_bundler::DefaultBundler;
pub use ncc::{NccBundler, DIST_PREFIX};
pub use ttsc::TtscTranspiler;

/// Placeholder substituted with the entrypoint path in user templates
const ENTRY_PLACEHOLDER: &str = "{entry}";

/// Trait for compiler implementations
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile a single entrypoint, returning the produced file path
    /// (relative to the project directory).
    async fn compile(&self, source_file: &str) -> Result<String>;
}

/// Substitute the entrypoint path into a user-supplied template.
fn render_entry(template: &str, entry: &str) -> String {
    template.replace(ENTRY_PLACEHOLDER, entry)
}
