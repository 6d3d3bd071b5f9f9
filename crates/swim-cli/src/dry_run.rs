//! Transport that logs requests instead of sending them.

use serde_json::{json, Value};
use std::cell::Cell;
use swim_client::{PostRequest, Transport, TransportError, TransportResponse};

/// Accepts every request with a 200 and logs a summary of the payload.
#[derive(Debug, Default)]
pub struct DryRunTransport {
    requests: Cell<u32>,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests seen so far.
    pub fn requests(&self) -> u32 {
        self.requests.get()
    }
}

fn record_count(body: &Value) -> usize {
    ["tracks", "flights"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(Vec::len)
        .unwrap_or(0)
}

impl Transport for DryRunTransport {
    fn post(&self, request: &PostRequest<'_>) -> Result<TransportResponse, TransportError> {
        self.requests.set(self.requests.get() + 1);

        let body: Value = serde_json::from_str(request.body).unwrap_or(Value::Null);
        let count = record_count(&body);
        tracing::info!("[dry-run] POST {} ({} records)", request.url, count);
        tracing::debug!("[dry-run] body: {}", request.body);

        Ok(TransportResponse {
            status: 200,
            body: json!({ "success": true, "data": { "processed": count } }).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_dry_run_counts_records() {
        let transport = DryRunTransport::new();
        let request = PostRequest {
            url: "http://localhost/ingest/track",
            body: r#"{"tracks":[{"callsign":"A"},{"callsign":"B"}]}"#,
            headers: Vec::new(),
            timeout: Duration::from_secs(1),
        };

        let response = transport.post(&request).unwrap();
        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["data"]["processed"], 2);
        assert_eq!(transport.requests(), 1);
    }

    #[test]
    fn test_dry_run_tolerates_unknown_payload() {
        let transport = DryRunTransport::new();
        let request = PostRequest {
            url: "http://localhost/ingest/adl",
            body: "not json",
            headers: Vec::new(),
            timeout: Duration::from_secs(1),
        };
        let response = transport.post(&request).unwrap();
        assert!(response.body.contains("\"processed\":0"));
    }
}
