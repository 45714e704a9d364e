//! Hook generation error types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error kinds raised while deriving hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// The hook configuration is missing a field or has the wrong shape
    ConfigurationError,
    /// A derived identifier came out empty or malformed
    InvalidNameError,
    /// A payload value could not be encoded
    SerializationError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "ConfigurationError",
            Self::InvalidNameError => "InvalidNameError",
            Self::SerializationError => "SerializationError",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every hook derivation step
///
/// All errors are fatal to a build: no descriptors are produced once one is raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct HookError {
    pub code: ErrorCode,
    pub message: String,
    /// Configuration field or entity the error refers to, when there is one
    pub field: Option<String>,
}

impl HookError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message)
    }

    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidNameError, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Format as a JSON error document
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct JsonError<'a> {
            code: &'static str,
            message: &'a str,
            field: Option<&'a str>,
        }

        let error = JsonError {
            code: self.code.as_str(),
            message: &self.message,
            field: self.field.as_deref(),
        };

        serde_json::to_string(&error).unwrap_or_else(|_| {
            format!(r#"{{"code":"{}","message":"{}"}}"#, self.code.as_str(), self.message)
        })
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, err.to_string())
    }
}
