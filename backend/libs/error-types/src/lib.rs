//! Uniform JSON error envelope for the adoption backend
//!
//! Every handler failure is rendered as
//!
//! ```json
//! { "error": "human readable message", "status": 502, "detail": { ... } }
//! ```
//!
//! `detail` is only present when there is something to attach, typically the
//! body returned by a proxied upstream service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Standard HTTP error response format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// HTTP status code
    pub status: u16,

    /// Optional upstream payload or structured context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Attach an upstream body, keeping it as JSON when it parses and as a
    /// plain string otherwise.
    pub fn with_raw_detail(self, body: &str) -> Self {
        if body.trim().is_empty() {
            return self;
        }
        let detail = serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
        self.with_detail(detail)
    }
}
