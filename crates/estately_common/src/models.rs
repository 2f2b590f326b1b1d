// --- File: crates/estately_common/src/models.rs ---

// Data structures shared by every crate that talks to the marketplace API.

use serde::{Deserialize, Serialize};

use crate::error::{api_error, EstatelyError};

/// The envelope every marketplace endpoint answers with.
///
/// ```json
/// { "error": false, "message": "Data fetched", "data": { ... }, "total": 12 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> ApiEnvelope<T> {
    /// Turns an `error: true` envelope into [`EstatelyError::ApiError`].
    pub fn into_result(self) -> Result<ApiPayload<T>, EstatelyError> {
        if self.error {
            return Err(api_error(self.message.unwrap_or_default()));
        }
        Ok(ApiPayload {
            data: self.data,
            message: self.message,
            total: self.total,
        })
    }
}

/// A successful envelope with the error flag stripped.
#[derive(Debug, Clone)]
pub struct ApiPayload<T> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub total: Option<u64>,
}

impl<T> ApiPayload<T> {
    /// The data, or a parse error naming `what` when the server sent none.
    pub fn require_data(self, what: &str) -> Result<T, EstatelyError> {
        self.data
            .ok_or_else(|| EstatelyError::ParseError(format!("missing data in {what} response")))
    }
}
