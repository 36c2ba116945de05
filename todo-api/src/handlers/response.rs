//! JSON envelopes for successful responses
//!
//! Payloads are wrapped under a named key, e.g. `{"todo": {...}}` or
//! `{"todos": [...], "metadata": {...}}`.
//!
//! # Example
//!
//! ```rust
//! use todo_api::handlers::Envelope;
//!
//! let envelope = Envelope::new()
//!     .with("message", "todo item successfully deleted")
//!     .unwrap();
//! assert_eq!(
//!     envelope.into_value(),
//!     serde_json::json!({"message": "todo item successfully deleted"})
//! );
//! ```

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ApiError;

/// Named top-level keys of a response body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `key`
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(value).map_err(ApiError::internal)?;
        self.0.insert(key.to_string(), value);
        Ok(self)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Respond with `status`, extra `headers` and this envelope as the body
    pub fn respond(self, status: StatusCode, headers: HeaderMap) -> Response {
        (status, headers, Json(self.into_value())).into_response()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self.into_value()).into_response()
    }
}
