//! Typed views of the KnowBase response bodies.
//!
//! The client returns bodies as [`serde_json::Value`] so that unknown fields survive untouched.
//! These types are for callers that want to pick the known fields out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Body of `POST /chat/message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub references: Vec<String>,
    /// Milliseconds since the Unix epoch, stamped by the backend
    #[serde(default)]
    pub timestamp: i64,
}

/// Body of `POST /documents/upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

/// Request body of `POST /chat/message`
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
}

impl TryFrom<Value> for HealthResponse {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl TryFrom<Value> for ChatResponse {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl TryFrom<Value> for UploadResponse {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
