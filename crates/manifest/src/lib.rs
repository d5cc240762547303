#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Action manifest handling for actpack
//!
//! This crate defines the model for the action manifest (`action.yml` /
//! `action.yaml`) and provides loading, classification, and atomic
//! persistence. The `runs` block is a tagged union on `runs.using`;
//! unrecognized keys anywhere in the document are preserved across a
//! load / mutate / save cycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use actpack_errors::{Error, ManifestError, Result};
use tracing::debug;

/// Accepted manifest filenames; exactly one must exist in the build directory.
pub const MANIFEST_FILENAMES: [&str; 2] = ["action.yml", "action.yaml"];

/// Discriminator values accepted in `runs.using`.
const USING_NODE_SCRIPT: &str = "node-script";
const USING_CONTAINER: &str = "container";

/// The action manifest (action.yml contents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub runs: Runs,
    /// Fields this tool does not understand, carried through verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yml::Value>,
}

/// The `runs` block, discriminated by `using`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "using")]
pub enum Runs {
    #[serde(rename = "node-script")]
    NodeScript(ScriptRuns),
    #[serde(rename = "container")]
    Container(ContainerRuns),
}

/// `runs` fields for the script execution model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRuns {
    /// Required for a publishable action; enforced at build time so the
    /// error carries build semantics rather than a parse failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yml::Value>,
}

/// `runs` fields for the container execution model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRuns {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yml::Value>,
}

/// Execution model of an action, derived from `runs.using`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Script,
    Container,
}

impl Manifest {
    /// Locate the manifest file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::NotFound` if neither accepted filename
    /// exists, `ManifestError::Ambiguous` if both do.
    pub fn locate(dir: &Path) -> Result<PathBuf> {
        let candidates: Vec<PathBuf> = MANIFEST_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| path.is_file())
            .collect();

        match candidates.as_slice() {
            [path] => Ok(path.clone()),
            [] => Err(ManifestError::NotFound {
                dir: dir.display().to_string(),
            }
            .into()),
            _ => Err(ManifestError::Ambiguous {
                dir: dir.display().to_string(),
            }
            .into()),
        }
    }

    /// Load and validate the manifest from `dir`.
    ///
    /// Returns the parsed manifest together with the path it was read
    /// from, so the caller can persist it back after the build.
    ///
    /// # Errors
    ///
    /// Returns an error if no unique manifest file exists, the document
    /// is not valid YAML, the shape does not match the expected model,
    /// or `runs.using` has an unknown value.
    pub async fn load(dir: &Path) -> Result<(Self, PathBuf)> {
        let path = Self::locate(dir)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;

        let manifest = Self::parse(&text)?;
        debug!(path = %path.display(), kind = ?manifest.kind(), "loaded action manifest");
        Ok((manifest, path))
    }

    /// Parse and validate a manifest document.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` variants describing the offending field.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: serde_yml::Value =
            serde_yml::from_str(text).map_err(|e| ManifestError::ParseError {
                message: e.to_string(),
            })?;

        validate_shape(&doc)?;

        serde_yml::from_value(doc)
            .map_err(|e| {
                ManifestError::ParseError {
                    message: e.to_string(),
                }
                .into()
            })
    }

    /// Classify the manifest by its `runs.using` discriminator.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self.runs {
            Runs::NodeScript(_) => ActionKind::Script,
            Runs::Container(_) => ActionKind::Container,
        }
    }

    /// Script-variant accessor; `None` for container manifests.
    #[must_use]
    pub fn script_runs(&self) -> Option<&ScriptRuns> {
        match &self.runs {
            Runs::NodeScript(runs) => Some(runs),
            Runs::Container(_) => None,
        }
    }

    /// Mutable script-variant accessor; `None` for container manifests.
    pub fn script_runs_mut(&mut self) -> Option<&mut ScriptRuns> {
        match &mut self.runs {
            Runs::NodeScript(runs) => Some(runs),
            Runs::Container(_) => None,
        }
    }

    /// Container-variant accessor; `None` for script manifests.
    #[must_use]
    pub fn container_runs(&self) -> Option<&ContainerRuns> {
        match &self.runs {
            Runs::Container(runs) => Some(runs),
            Runs::NodeScript(_) => None,
        }
    }

    /// Mutable container-variant accessor; `None` for script manifests.
    pub fn container_runs_mut(&mut self) -> Option<&mut ContainerRuns> {
        match &mut self.runs {
            Runs::Container(runs) => Some(runs),
            Runs::NodeScript(_) => None,
        }
    }

    /// Serialize the manifest back to `path`.
    ///
    /// The document is written to a temporary file in the same directory
    /// and renamed over the original, so a reader of the final artifact
    /// never observes a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the filesystem operations fail.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yml::to_string(self).map_err(|e| ManifestError::SerializeError {
            message: e.to_string(),
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::io_with_path(&e, dir))?;
        file.write_all(text.as_bytes())
            .map_err(|e| Error::io_with_path(&e, path))?;
        file.persist(path)
            .map_err(|e| Error::io_with_path(&e.error, path))?;

        debug!(path = %path.display(), "saved action manifest");
        Ok(())
    }
}

/// Structural validation with field-path error reporting, run before the
/// typed deserialization so unknown discriminators and missing required
/// fields surface as manifest errors instead of serde messages.
fn validate_shape(doc: &serde_yml::Value) -> Result<()> {
    let root = doc
        .as_mapping()
        .ok_or_else(|| invalid("<root>", "expected a mapping"))?;

    require_string(root, "name")?;
    require_string(root, "description")?;

    let runs = root
        .get("runs")
        .ok_or_else(|| invalid("runs", "missing required field"))?
        .as_mapping()
        .ok_or_else(|| invalid("runs", "expected a mapping"))?;

    let using = runs
        .get("using")
        .ok_or_else(|| invalid("runs.using", "missing required field"))?
        .as_str()
        .ok_or_else(|| invalid("runs.using", "expected a string"))?;

    match using {
        USING_NODE_SCRIPT => {
            for field in ["main", "pre", "post"] {
                if let Some(value) = runs.get(field) {
                    if !value.is_string() {
                        return Err(invalid(&format!("runs.{field}"), "expected a string"));
                    }
                }
            }
        }
        USING_CONTAINER => {
            match runs.get("image") {
                None => return Err(invalid("runs.image", "missing required field")),
                Some(value) if !value.is_string() => {
                    return Err(invalid("runs.image", "expected a string"));
                }
                Some(_) => {}
            }
            if runs.get("entrypoint").is_some_and(|v| !v.is_string()) {
                return Err(invalid("runs.entrypoint", "expected a string"));
            }
            if runs.get("args").is_some_and(|v| !v.is_sequence()) {
                return Err(invalid("runs.args", "expected a sequence"));
            }
            if runs.get("env").is_some_and(|v| !v.is_mapping()) {
                return Err(invalid("runs.env", "expected a mapping"));
            }
        }
        other => {
            return Err(ManifestError::UnknownRunsUsing {
                value: other.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn require_string(mapping: &serde_yml::Mapping, field: &str) -> Result<()> {
    match mapping.get(field) {
        None => Err(invalid(field, "missing required field")),
        Some(value) if !value.is_string() => Err(invalid(field, "expected a string")),
        Some(_) => Ok(()),
    }
}

fn invalid(field: &str, message: &str) -> Error {
    ManifestError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}
