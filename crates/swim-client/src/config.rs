//! Client and session configuration.

use std::env;
use std::time::Duration;
use swim_core::ThrottleConfig;

pub const DEFAULT_BASE_URL: &str = "https://perti.vatcscc.org/api/swim/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for the SWIM API. Immutable once a client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Sent as `X-SWIM-Source` when non-empty
    pub source_id: String,
    pub timeout: Duration,
    pub verify_ssl: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            source_id: String::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            verify_ssl: true,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("SWIM_API_KEY").unwrap_or_default(),
            base_url: env::var("SWIM_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.base_url),
            source_id: env::var("SWIM_SOURCE_ID").unwrap_or_default(),
            timeout: env::var("SWIM_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            verify_ssl: env::var("SWIM_VERIFY_SSL")
                .ok()
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.verify_ssl),
        }
    }

    /// Replace an empty base URL and a zero timeout with the defaults.
    pub fn normalized(self) -> Self {
        Self {
            base_url: if self.base_url.trim().is_empty() {
                DEFAULT_BASE_URL.to_string()
            } else {
                self.base_url
            },
            timeout: if self.timeout.is_zero() {
                Duration::from_millis(DEFAULT_TIMEOUT_MS)
            } else {
                self.timeout
            },
            ..self
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url(), endpoint)
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Per-flight reporting settings for a [`crate::FlightSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub callsign: String,
    pub departure: String,
    pub destination: String,
    pub enable_tracks: bool,
    pub enable_oooi: bool,
    pub throttle: ThrottleConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            callsign: String::new(),
            departure: String::new(),
            destination: String::new(),
            enable_tracks: true,
            enable_oooi: true,
            throttle: ThrottleConfig::default(),
        }
    }
}
