//! Transport error types
//!
//! Every failure the backend client can produce. The transport logs and
//! returns these unchanged; views turn them into a message string.

use thiserror::Error;

/// Generic message shown for failures a view should not detail
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Errors that can occur when talking to the incubator backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend could not be reached
    #[error("Backend unavailable")]
    Unavailable,

    /// Request did not complete in time
    #[error("Request timeout")]
    Timeout,

    /// Any other transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 401 or 403
    #[error("Unauthorized ({status})")]
    Unauthorized { status: u16 },

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 422, or a client-side constraint failed before sending
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-2xx status
    #[error("API error {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Client could not be constructed or configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify a reqwest failure the same way for every call site
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unavailable
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Request(err)
        }
    }

    /// Map a non-2xx status and its body to an error
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        match status {
            401 | 403 => ApiError::Unauthorized { status },
            404 => ApiError::NotFound(detail),
            422 => ApiError::Validation(detail),
            _ => ApiError::Status { status, detail },
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status } | ApiError::Status { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            ApiError::Validation(_) => Some(422),
            _ => None,
        }
    }

    /// Message a view stores after catching this error.
    ///
    /// Not-found and authorization failures are deliberately indistinguishable.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound(_) | ApiError::Unauthorized { .. } => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            ApiError::Unavailable | ApiError::Timeout | ApiError::Request(_) => {
                format!("Network error: {}", self)
            }
            ApiError::Validation(detail) => detail.clone(),
            ApiError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Pull the `detail` field out of a FastAPI error body.
///
/// `detail` is either a string or a list of `{loc, msg, type}` entries.
/// Anything else falls back to the raw body.
fn extract_detail(body: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.trim().to_string(),
    };

    match value.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
