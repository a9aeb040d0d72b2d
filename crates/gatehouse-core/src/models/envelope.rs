use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Shared response envelope returned by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<Vec<ErrorDetail>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}

impl<T> ApiResponse<T> {
    /// Unwrap the `data` payload, failing when the backend omitted it.
    pub fn into_data(self) -> Result<T, ApiError> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(ApiError::missing_data(&self.message)),
        }
    }

    /// First error message the backend reported, falling back to the envelope message.
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|e| e.message.as_str())
            .or_else(|| (!self.message.is_empty()).then_some(self.message.as_str()))
    }
}
