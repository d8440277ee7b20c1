use std::collections::BTreeMap;

use super::event::FunctionResponse;
use super::response::ApiResult;

pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Session-Token";
pub const MAX_AGE_SECS: &str = "86400";

/// Per-function CORS policy. Origins are always `*`; only the method list differs.
#[derive(Debug, Clone, Copy)]
pub struct Cors {
    pub allow_methods: &'static str,
}

impl Cors {
    pub const fn new(allow_methods: &'static str) -> Self {
        Self { allow_methods }
    }

    /// 200 with the full header set and an empty body
    pub fn preflight(&self) -> FunctionResponse {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Access-Control-Allow-Methods".to_string(), self.allow_methods.to_string());
        headers.insert("Access-Control-Allow-Headers".to_string(), ALLOW_HEADERS.to_string());
        headers.insert("Access-Control-Max-Age".to_string(), MAX_AGE_SECS.to_string());

        FunctionResponse {
            status_code: 200,
            headers,
            body: String::new(),
        }
    }

    /// Render a handler result (success or error) as a JSON response with CORS headers
    pub fn respond(&self, result: ApiResult) -> FunctionResponse {
        let (status_code, body) = match result {
            Ok(response) => (response.status_code.as_u16(), response.body),
            Err(err) => (err.status_code(), err.to_json()),
        };

        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        FunctionResponse {
            status_code,
            headers,
            body: body.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use crate::error::ApiError;
    use serde_json::json;

    const CORS: Cors = Cors::new("GET, OPTIONS");

    #[test]
    fn preflight_carries_full_header_set() {
        let response = CORS.preflight();
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
        assert_eq!(response.header("access-control-allow-methods"), Some("GET, OPTIONS"));
        assert_eq!(response.header("Access-Control-Allow-Headers"), Some(ALLOW_HEADERS));
        assert_eq!(response.header("Access-Control-Max-Age"), Some("86400"));
    }

    #[test]
    fn errors_and_successes_both_allow_any_origin() {
        let ok = CORS.respond(Ok(ApiResponse::success(json!({"success": true}))));
        let err = CORS.respond(Err(ApiError::not_found("Tournament not found")));

        assert_eq!(ok.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(err.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(err.status_code, 404);
        assert_eq!(err.json().unwrap()["error"], json!("Tournament not found"));
    }
}
