use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CopperError {
    #[error("Validation error on `{field}`: {message}")]
    Validation {
        field: String,
        message: String,
        value: Option<Value>,
    },

    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
        /// The piece of the input that could not be mapped.
        fragment: Option<Value>,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl CopperError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            value: Some(value),
        }
    }

    pub fn transformation(message: impl Into<String>, fragment: Option<Value>) -> Self {
        Self::Transformation {
            message: message.into(),
            fragment,
        }
    }

    /// Stable error type code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            CopperError::Validation { .. } => "VALIDATION_ERROR",
            CopperError::Transformation { .. } => "TRANSFORMATION_ERROR",
            CopperError::Authentication(_) => "AUTHENTICATION_ERROR",
            CopperError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Structured detail object for the error envelope.
    pub fn details(&self) -> Value {
        match self {
            CopperError::Validation { field, value, .. } => json!({ "field": field, "value": value }),
            CopperError::Transformation { fragment, .. } => json!({ "fragment": fragment }),
            CopperError::Authentication(_) => json!({ "required": ["api_token", "email"] }),
            CopperError::Config(_) => json!({}),
        }
    }
}

pub type Result<T> = std::result::Result<T, CopperError>;
