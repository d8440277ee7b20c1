use axum::http::StatusCode;
use serde_json::Value;

/// Successful function result: a status code and a flat JSON body
///
/// Bodies are emitted as-is (`{"success": true, "users": [...]}`), there is no
/// `data` wrapper.
#[derive(Debug)]
pub struct ApiResponse {
    pub body: Value,
    pub status_code: StatusCode,
}

impl ApiResponse {
    /// Create a successful API response with default 200 status
    pub fn success(body: Value) -> Self {
        Self::with_status(body, StatusCode::OK)
    }

    /// Create an API response with custom status code
    pub fn with_status(body: Value, status_code: StatusCode) -> Self {
        Self { body, status_code }
    }

    /// Create a 201 Created response
    pub fn created(body: Value) -> Self {
        Self::with_status(body, StatusCode::CREATED)
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;
