use serde_json::Value;
use thiserror::Error;

/// Message used when the backend's error body cannot be parsed.
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a non-success status, or with a body that
    /// could not be parsed into the expected shape.
    #[error("{message} (status {status})")]
    Request {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A successful response whose envelope omitted `data`.
    #[error("{0}")]
    MissingData(String),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a request error from a non-success response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(parsed) if parsed.is_object() => {
                let message = parsed
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(FALLBACK_MESSAGE)
                    .to_string();
                ApiError::Request {
                    status,
                    message,
                    body: parsed,
                }
            }
            _ => Self::fallback(status),
        }
    }

    /// Generic request error used when a body could not be parsed.
    pub fn fallback(status: u16) -> Self {
        ApiError::Request {
            status,
            message: FALLBACK_MESSAGE.to_string(),
            body: serde_json::json!({ "message": FALLBACK_MESSAGE }),
        }
    }

    pub(crate) fn missing_data(message: &str) -> Self {
        if message.is_empty() {
            ApiError::MissingData("Response carried no data".to_string())
        } else {
            ApiError::MissingData(format!("Response carried no data: {}", message))
        }
    }

    /// HTTP status of the failed request, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidRequest(_) | ApiError::MissingData(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
