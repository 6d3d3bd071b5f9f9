//! Ingest call results.

use crate::error::SwimStatus;
use crate::transport::{TransportError, TransportResponse};
use serde_json::Value;

/// Outcome of one ingest call. Produced fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestResult {
    pub status: SwimStatus,
    /// HTTP status, absent when the request never completed
    pub http_code: Option<u16>,
    pub processed: u32,
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
    pub error_message: String,
}

impl IngestResult {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::failure(SwimStatus::InvalidData, message)
    }

    pub fn failure(status: SwimStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            error_message: message.into(),
            ..Self::default()
        }
    }

    pub fn from_transport_error(err: &TransportError) -> Self {
        let status = match err {
            TransportError::Timeout(_) => SwimStatus::Timeout,
            TransportError::Network(_) => SwimStatus::Network,
        };
        Self::failure(status, err.to_string())
    }

    /// Map a completed HTTP exchange to a domain result.
    pub fn from_response(response: &TransportResponse) -> Self {
        let code = response.status;
        let status = SwimStatus::from_http(code);
        let body: Option<Value> = serde_json::from_str(&response.body).ok();

        let mut result = Self {
            status,
            http_code: Some(code),
            ..Self::default()
        };

        if status.is_ok() {
            if let Some(body) = &body {
                let counters = body
                    .get("data")
                    .filter(|data| data.is_object())
                    .unwrap_or(body);
                result.processed = read_count(counters, "processed");
                result.created = read_count(counters, "created");
                result.updated = read_count(counters, "updated");
                result.errors = read_count(counters, "errors");
            }
            return result;
        }

        let summary = match status {
            SwimStatus::Auth => format!("Authentication failed (HTTP {code})"),
            SwimStatus::RateLimited => "Rate limit exceeded".to_string(),
            SwimStatus::Server => format!("Server error (HTTP {code})"),
            _ => format!("Request failed (HTTP {code})"),
        };
        let server_message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());
        result.error_message = match server_message {
            Some(message) => format!("{summary}: {message}"),
            None => summary,
        };
        result
    }
}

fn read_count(value: &Value, key: &str) -> u32 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
