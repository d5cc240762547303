//! Action manifest error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("no action manifest found in {dir}")]
    NotFound { dir: String },

    #[error("both action.yml and action.yaml found in {dir}; only one of them must be present")]
    Ambiguous { dir: String },

    #[error("invalid manifest field {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("unknown runs.using value: {value}")]
    UnknownRunsUsing { value: String },

    #[error("manifest parse error: {message}")]
    ParseError { message: String },

    #[error("manifest serialize error: {message}")]
    SerializeError { message: String },
}

impl UserFacingError for ManifestError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Add an action.yml (or action.yaml) to the working directory.")
            }
            Self::Ambiguous { .. } => Some("Remove one of the two manifest files."),
            Self::Invalid { .. } | Self::ParseError { .. } => {
                Some("Fix the manifest field noted in the error message.")
            }
            Self::UnknownRunsUsing { .. } => {
                Some("Set runs.using to either `node-script` or `container`.")
            }
            Self::SerializeError { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "manifest.not_found",
            Self::Ambiguous { .. } => "manifest.ambiguous",
            Self::Invalid { .. } => "manifest.invalid",
            Self::UnknownRunsUsing { .. } => "manifest.unknown_runs_using",
            Self::ParseError { .. } => "manifest.parse_error",
            Self::SerializeError { .. } => "manifest.serialize_error",
        };
        Some(code)
    }
}
