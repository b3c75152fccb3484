//! JSON bodies exchanged on the ping endpoint.

use serde::{Deserialize, Serialize};

/// Route of the presence endpoint, relative to the server root.
pub const PING_PATH: &str = "/api/ping";

/// Successful ping response: `{"status": "ok", "count": N}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub status: String,
    pub count: u64,
}

impl PingResponse {
    pub fn ok(count: u64) -> Self {
        Self {
            status: "ok".to_string(),
            count,
        }
    }
}

/// Error response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
