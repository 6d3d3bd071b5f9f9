//! Error taxonomy for SWIM ingest calls.

use std::fmt;
use thiserror::Error;

/// Domain status of an ingest call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SwimStatus {
    #[default]
    Ok,
    /// Bad or empty input, or an unexpected HTTP status
    InvalidData,
    /// Request body could not be serialized
    Buffer,
    /// Connection-level failure
    Network,
    Timeout,
    /// HTTP 401/403
    Auth,
    /// HTTP 429
    RateLimited,
    /// HTTP 5xx
    Server,
}

impl SwimStatus {
    pub fn is_ok(&self) -> bool {
        *self == SwimStatus::Ok
    }

    /// Map a completed HTTP response code to a domain status.
    pub fn from_http(code: u16) -> Self {
        match code {
            200 | 201 => SwimStatus::Ok,
            401 | 403 => SwimStatus::Auth,
            429 => SwimStatus::RateLimited,
            c if c >= 500 => SwimStatus::Server,
            _ => SwimStatus::InvalidData,
        }
    }
}

impl fmt::Display for SwimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwimStatus::Ok => "ok",
            SwimStatus::InvalidData => "invalid data",
            SwimStatus::Buffer => "buffer error",
            SwimStatus::Network => "network error",
            SwimStatus::Timeout => "timeout",
            SwimStatus::Auth => "authentication error",
            SwimStatus::RateLimited => "rate limited",
            SwimStatus::Server => "server error",
        };
        f.write_str(name)
    }
}

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum SwimError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
