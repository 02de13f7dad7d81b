//! JSON bodies of the HTTP surface, shared by the daemon and `pitctl`.

use serde::{Deserialize, Serialize};

/// `GET /state` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// One rendered string per pit, `"Empty"` when vacant.
    pub pit_log: Vec<String>,
    /// Trailing summary window.
    pub summary: Vec<String>,
    /// Trailing event-log window.
    pub log: Vec<String>,
    /// True once the fill policy has occupied every pit.
    pub finished: bool,
}

/// `{"status": ...}` body returned by the control endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `uploaded`, `started`, `stopped` or `reset`.
    pub status: String,
}

impl StatusResponse {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }

    /// Reply to `POST /upload`.
    pub fn uploaded() -> Self {
        Self::new("uploaded")
    }

    /// Reply to `POST /start`.
    pub fn started() -> Self {
        Self::new("started")
    }

    /// Reply to `POST /stop`.
    pub fn stopped() -> Self {
        Self::new("stopped")
    }

    /// Reply to `POST /reset`.
    pub fn reset() -> Self {
        Self::new("reset")
    }
}

/// Fallback body for `GET /` when no frontend page is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable liveness note.
    pub message: String,
}

impl MessageResponse {
    /// The message served when the frontend file is missing.
    pub fn backend_running() -> Self {
        Self {
            message: "ALPR Backend is running".to_string(),
        }
    }
}

/// Error body for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// What was wrong with the request.
    pub error: String,
}
