//! Error type shared by all components.

use thiserror::Error;

/// Errors produced while building the registry, configuring the model or processing records.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A required value is missing or malformed.
    #[error("{component}: {message}")]
    InputValidation { component: &'static str, message: String },
    /// A value is well-formed but not supported (unknown vendor, instance type, interpolation mode, ...).
    #[error("{component}: unsupported {field} '{value}': {reason}")]
    UnsupportedValue {
        component: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },
    /// Reference table or config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Reference table or config file could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl ModelError {
    pub(crate) fn input(component: &'static str, message: impl Into<String>) -> Self {
        ModelError::InputValidation {
            component,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(
        component: &'static str,
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ModelError::UnsupportedValue {
            component,
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Prefixes the message of a validation error with the position of the offending record.
    pub(crate) fn in_record(self, index: usize, timestamp: Option<&str>) -> Self {
        let at = match timestamp {
            Some(timestamp) => format!("record #{} ({})", index, timestamp),
            None => format!("record #{}", index),
        };
        match self {
            ModelError::InputValidation { component, message } => ModelError::InputValidation {
                component,
                message: format!("{}: {}", at, message),
            },
            ModelError::UnsupportedValue {
                component,
                field,
                value,
                reason,
            } => ModelError::UnsupportedValue {
                component,
                field,
                value,
                reason: format!("{} in {}", reason, at),
            },
            other => other,
        }
    }

    /// Returns true for [`ModelError::InputValidation`].
    pub fn is_input_validation(&self) -> bool {
        matches!(self, ModelError::InputValidation { .. })
    }

    /// Returns true for [`ModelError::UnsupportedValue`].
    pub fn is_unsupported_value(&self) -> bool {
        matches!(self, ModelError::UnsupportedValue { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ModelError>;
