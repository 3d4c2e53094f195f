use copper_core::CopperError;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Errors returned by the Copper HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{resource_type} {resource_id} not found")]
    NotFound {
        resource_type: String,
        resource_id: String,
    },

    #[error("Rate limited by Copper API")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Copper API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Map a final (non-retried) error status to a typed error.
    pub(crate) fn from_status(status: StatusCode, path: &str, retry_after_secs: Option<u64>, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApiError::Authentication(format!("Copper rejected credentials ({})", status.as_u16()))
            }
            StatusCode::NOT_FOUND => {
                let mut segments = path.trim_matches('/').split('/');
                ApiError::NotFound {
                    resource_type: segments.next().unwrap_or_default().to_string(),
                    resource_id: segments.next().unwrap_or_default().to_string(),
                }
            }
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after_secs },
            _ => ApiError::Upstream {
                status: status.as_u16(),
                message: upstream_message(body),
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "AUTHENTICATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND_ERROR",
            ApiError::RateLimited { .. } => "RATE_LIMIT_ERROR",
            ApiError::Upstream { .. } | ApiError::Http(_) | ApiError::Decode(_) => "UPSTREAM_API_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            ApiError::Authentication(_) => json!({ "required": ["api_token", "email"] }),
            ApiError::NotFound { resource_type, resource_id } => {
                json!({ "resource_type": resource_type, "resource_id": resource_id })
            }
            ApiError::RateLimited { retry_after_secs } => json!({ "retry_after": retry_after_secs }),
            ApiError::Upstream { status, .. } => json!({ "status": status }),
            ApiError::Http(e) => json!({ "status": e.status().map(|s| s.as_u16()) }),
            ApiError::Decode(_) | ApiError::Config(_) => json!({}),
        }
    }

    /// Worth retrying at the transport boundary.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
            || matches!(self, ApiError::Upstream { status, .. } if *status >= 500)
    }
}

impl From<CopperError> for ApiError {
    fn from(err: CopperError) -> Self {
        match err {
            CopperError::Authentication(msg) => ApiError::Authentication(msg),
            other => ApiError::Config(other.to_string()),
        }
    }
}

/// Copper error bodies look like `{"success": false, "status": 422, "message": "..."}`.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(500).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let e = ApiError::from_status(StatusCode::NOT_FOUND, "people/42", None, "");
        assert_eq!(e.code(), "NOT_FOUND_ERROR");
        assert_eq!(e.details(), json!({ "resource_type": "people", "resource_id": "42" }));

        let e = ApiError::from_status(StatusCode::FORBIDDEN, "people/42", None, "");
        assert_eq!(e.code(), "AUTHENTICATION_ERROR");

        let e = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "people",
            None,
            r#"{"success":false,"status":422,"message":"Name is required"}"#,
        );
        assert!(matches!(e, ApiError::Upstream { status: 422, ref message } if message == "Name is required"));
        assert!(!e.is_retryable());

        let e = ApiError::from_status(StatusCode::BAD_GATEWAY, "tasks", None, "<html>bad gateway</html>");
        assert_eq!(e.code(), "UPSTREAM_API_ERROR");
        assert!(e.is_retryable());
    }

    #[test]
    fn missing_credentials_become_authentication_errors() {
        let e: ApiError = CopperError::Authentication("missing".into()).into();
        assert_eq!(e.code(), "AUTHENTICATION_ERROR");
    }
}
