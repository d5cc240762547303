//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("missing required configuration value: {key}")]
    MissingRequired { key: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingRequired { .. } => {
                Some("Set the input named in the error message (INPUT_* environment variable).")
            }
            Self::InvalidValue { .. } => Some("Fix the configuration value and retry."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingRequired { .. } => "config.missing_required",
            Self::InvalidValue { .. } => "config.invalid_value",
        };
        Some(code)
    }
}
