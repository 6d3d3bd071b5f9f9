//! SWIM ingest client.

use crate::config::ClientConfig;
use crate::error::{SwimError, SwimStatus};
use crate::response::IngestResult;
use crate::transport::{HttpTransport, PostRequest, Transport};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use swim_core::{
    FlightIngest, OooiDetector, OooiTimes, Position, PositionThrottle, TelemetrySample,
    ThrottleConfig, TrackUpdate,
};

/// Max track entries per `/ingest/track` request.
pub const MAX_BATCH_TRACKS: usize = 1000;
/// Max flight entries per `/ingest/adl` request.
pub const MAX_BATCH_ADL: usize = 500;

const TRACK_ENDPOINT: &str = "/ingest/track";
const ADL_ENDPOINT: &str = "/ingest/adl";

#[derive(Serialize)]
struct TrackBatch<'a> {
    tracks: &'a [TrackUpdate],
}

#[derive(Serialize)]
struct FlightBatch<'a> {
    flights: &'a [FlightIngest],
}

/// Client for the SWIM ingest API.
///
/// Owns the OOOI detector and position throttle for one flight. Calls are
/// synchronous: every ingest blocks until the transport returns.
pub struct SwimClient<T: Transport = HttpTransport> {
    config: ClientConfig,
    transport: T,
    oooi: OooiDetector,
    throttle: PositionThrottle,
}

impl SwimClient<HttpTransport> {
    /// Create a client using the blocking HTTP transport and default throttle.
    pub fn new(config: ClientConfig) -> Result<Self, SwimError> {
        let transport = HttpTransport::new(config.verify_ssl)?;
        Self::with_transport(config, transport, ThrottleConfig::default())
    }
}

impl<T: Transport> SwimClient<T> {
    pub fn with_transport(
        config: ClientConfig,
        transport: T,
        throttle: ThrottleConfig,
    ) -> Result<Self, SwimError> {
        let config = config.normalized();
        Url::parse(config.base_url()).map_err(|e| SwimError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            config,
            transport,
            oooi: OooiDetector::new(),
            throttle: PositionThrottle::new(throttle),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ========== INGEST ==========

    /// Send track updates. Batches over [`MAX_BATCH_TRACKS`] are truncated.
    pub fn ingest_tracks(&self, tracks: &[TrackUpdate]) -> IngestResult {
        if tracks.is_empty() {
            return IngestResult::invalid("No tracks to send");
        }
        let tracks = &tracks[..tracks.len().min(MAX_BATCH_TRACKS)];
        self.post_json(TRACK_ENDPOINT, &TrackBatch { tracks })
    }

    /// Send flight (ADL) records. Batches over [`MAX_BATCH_ADL`] are truncated.
    pub fn ingest_adl(&self, flights: &[FlightIngest]) -> IngestResult {
        if flights.is_empty() {
            return IngestResult::invalid("No flights to send");
        }
        let flights = &flights[..flights.len().min(MAX_BATCH_ADL)];
        self.post_json(ADL_ENDPOINT, &FlightBatch { flights })
    }

    fn post_json<B: Serialize>(&self, endpoint: &str, body: &B) -> IngestResult {
        let body = match serde_json::to_string(body) {
            Ok(body) => body,
            Err(err) => {
                return IngestResult::failure(
                    SwimStatus::Buffer,
                    format!("Failed to serialize request body: {err}"),
                )
            }
        };

        let url = self.config.endpoint_url(endpoint);
        let mut headers = vec![
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("Bearer {}", self.config.api_key)),
        ];
        if !self.config.source_id.is_empty() {
            headers.push(("X-SWIM-Source", self.config.source_id.clone()));
        }

        let request = PostRequest {
            url: &url,
            body: &body,
            headers,
            timeout: self.config.timeout,
        };

        let result = match self.transport.post(&request) {
            Ok(response) => IngestResult::from_response(&response),
            Err(err) => IngestResult::from_transport_error(&err),
        };

        if result.is_ok() {
            tracing::debug!(
                "POST {} -> {} (processed {}, updated {})",
                endpoint,
                result.http_code.unwrap_or_default(),
                result.processed,
                result.updated
            );
        } else {
            tracing::warn!("POST {} failed: {} ({})", endpoint, result.status, result.error_message);
        }

        result
    }

    // ========== POSITION THROTTLING ==========

    pub fn should_send_position(&self, position: &Position) -> bool {
        self.throttle.should_send(position)
    }

    pub fn mark_position_sent(&mut self, position: &Position) {
        self.throttle.mark_sent(position);
    }

    pub fn throttle(&self) -> &PositionThrottle {
        &self.throttle
    }

    pub fn reset_throttle(&mut self) {
        self.throttle.reset();
    }

    /// Replace the throttle thresholds. Clears the last-sent record.
    pub fn set_throttle_config(&mut self, config: ThrottleConfig) {
        self.throttle = PositionThrottle::new(config);
    }

    /// Send a single track if the throttle allows it.
    ///
    /// Returns `None` when throttled (no network activity). The throttle is
    /// only advanced when the send succeeds, so a failed position is retried
    /// on the next due evaluation.
    pub fn send_position_if_due(
        &mut self,
        callsign: &str,
        position: &Position,
    ) -> Option<IngestResult> {
        self.send_position_if_due_at(callsign, position, Utc::now())
    }

    pub fn send_position_if_due_at(
        &mut self,
        callsign: &str,
        position: &Position,
        now: DateTime<Utc>,
    ) -> Option<IngestResult> {
        if callsign.is_empty() {
            return Some(IngestResult::invalid("Callsign is required"));
        }
        if !self.throttle.should_send_at(position, now) {
            return None;
        }

        let track = TrackUpdate::new(callsign, *position).with_timestamp(now);
        let result = self.ingest_tracks(std::slice::from_ref(&track));
        if result.is_ok() {
            self.throttle.mark_sent_at(position, now);
        }
        Some(result)
    }

    // ========== OOOI ==========

    /// Feed a sample to the OOOI detector. True if an event fired.
    pub fn update_oooi(&mut self, sample: &TelemetrySample) -> bool {
        self.oooi.update(sample)
    }

    pub fn update_oooi_at(&mut self, sample: &TelemetrySample, now: DateTime<Utc>) -> bool {
        self.oooi.update_at(sample, now)
    }

    pub fn oooi(&self) -> &OooiDetector {
        &self.oooi
    }

    pub fn oooi_times(&self) -> OooiTimes {
        self.oooi.times()
    }

    pub fn reset_oooi(&mut self) {
        self.oooi.reset();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transport::{TransportError, TransportResponse};
    use chrono::{Duration, TimeZone};
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Debug, Clone)]
    pub(crate) struct Recorded {
        pub url: String,
        pub body: Value,
        pub headers: Vec<(&'static str, String)>,
    }

    /// Transport that records requests and replays canned outcomes.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        pub requests: RefCell<Vec<Recorded>>,
        pub outcomes: RefCell<VecDeque<Result<TransportResponse, TransportError>>>,
    }

    impl FakeTransport {
        pub fn respond(&self, status: u16, body: &str) {
            self.outcomes.borrow_mut().push_back(Ok(TransportResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub fn fail(&self, err: TransportError) {
            self.outcomes.borrow_mut().push_back(Err(err));
        }

        pub fn calls(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn last(&self) -> Recorded {
            self.requests.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn post(&self, request: &PostRequest<'_>) -> Result<TransportResponse, TransportError> {
            self.requests.borrow_mut().push(Recorded {
                url: request.url.to_string(),
                body: serde_json::from_str(request.body).unwrap(),
                headers: request.headers.clone(),
            });
            self.outcomes.borrow_mut().pop_front().unwrap_or(Ok(TransportResponse {
                status: 200,
                body: r#"{"success":true,"data":{"processed":1}}"#.to_string(),
            }))
        }
    }

    pub(crate) fn test_client(config: ClientConfig) -> SwimClient<FakeTransport> {
        SwimClient::with_transport(config, FakeTransport::default(), ThrottleConfig::default())
            .unwrap()
    }

    fn config() -> ClientConfig {
        ClientConfig {
            api_key: "swim_par_test".to_string(),
            base_url: "http://swim.test/api/swim/v1".to_string(),
            source_id: "xplane_plugin".to_string(),
            ..ClientConfig::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 14, 0, 0).unwrap()
    }

    fn header<'a>(recorded: &'a Recorded, name: &str) -> Option<&'a str> {
        recorded
            .headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_ingest_tracks_truncates_to_max_batch() {
        let client = test_client(config());
        let tracks: Vec<TrackUpdate> = (0..1200)
            .map(|i| TrackUpdate::new(format!("TST{i}"), Position::new(40.0, -74.0, 1000)))
            .collect();

        let result = client.ingest_tracks(&tracks);
        assert!(result.is_ok());
        assert_eq!(client.transport().calls(), 1);
        let sent = client.transport().last();
        let array = sent.body["tracks"].as_array().unwrap();
        assert_eq!(array.len(), MAX_BATCH_TRACKS);
        assert_eq!(array[999]["callsign"], "TST999");
    }

    #[test]
    fn test_empty_batch_rejected_before_network() {
        let client = test_client(config());
        let result = client.ingest_tracks(&[]);
        assert_eq!(result.status, SwimStatus::InvalidData);
        assert_eq!(result.http_code, None);

        let result = client.ingest_adl(&[]);
        assert_eq!(result.status, SwimStatus::InvalidData);
        assert_eq!(client.transport().calls(), 0);
    }

    #[test]
    fn test_ingest_adl_truncates_and_targets_adl_endpoint() {
        let client = test_client(config());
        let flights: Vec<FlightIngest> = (0..600)
            .map(|i| FlightIngest::new(format!("AAL{i}"), "KJFK", "KLAX"))
            .collect();

        client.ingest_adl(&flights);
        let sent = client.transport().last();
        assert_eq!(sent.url, "http://swim.test/api/swim/v1/ingest/adl");
        assert_eq!(sent.body["flights"].as_array().unwrap().len(), MAX_BATCH_ADL);
    }

    #[test]
    fn test_request_headers() {
        let client = test_client(config());
        client.ingest_tracks(&[TrackUpdate::new("UAL1", Position::new(1.0, 2.0, 0))]);
        let sent = client.transport().last();
        assert_eq!(sent.url, "http://swim.test/api/swim/v1/ingest/track");
        assert_eq!(header(&sent, "Content-Type"), Some("application/json"));
        assert_eq!(header(&sent, "Authorization"), Some("Bearer swim_par_test"));
        assert_eq!(header(&sent, "X-SWIM-Source"), Some("xplane_plugin"));

        let client = test_client(ClientConfig {
            source_id: String::new(),
            ..config()
        });
        client.ingest_tracks(&[TrackUpdate::new("UAL1", Position::new(1.0, 2.0, 0))]);
        assert_eq!(header(&client.transport().last(), "X-SWIM-Source"), None);
    }

    #[test]
    fn test_transport_failures_map_to_status() {
        let client = test_client(config());
        let track = [TrackUpdate::new("UAL1", Position::new(1.0, 2.0, 0))];

        client.transport().fail(TransportError::Timeout("deadline".into()));
        assert_eq!(client.ingest_tracks(&track).status, SwimStatus::Timeout);

        client.transport().fail(TransportError::Network("refused".into()));
        assert_eq!(client.ingest_tracks(&track).status, SwimStatus::Network);

        client.transport().respond(403, "");
        assert_eq!(client.ingest_tracks(&track).status, SwimStatus::Auth);
    }

    #[test]
    fn test_send_position_if_due_throttles_without_network() {
        let mut client = test_client(config());
        let pos = Position::new(40.0, -74.0, 5000);

        let first = client.send_position_if_due_at("UAL1", &pos, t0()).unwrap();
        assert!(first.is_ok());
        assert_eq!(client.throttle().last_sent_at(), Some(t0()));
        let sent = client.transport().last();
        assert_eq!(sent.body["tracks"].as_array().unwrap().len(), 1);
        assert_eq!(sent.body["tracks"][0]["timestamp"], "2026-03-01T14:00:00Z");

        assert!(client
            .send_position_if_due_at("UAL1", &pos, t0() + Duration::seconds(2))
            .is_none());
        assert_eq!(client.transport().calls(), 1);
    }

    #[test]
    fn test_failed_send_does_not_consume_throttle() {
        let mut client = test_client(config());
        let pos = Position::new(40.0, -74.0, 5000);

        client.transport().respond(503, "");
        let result = client.send_position_if_due_at("UAL1", &pos, t0()).unwrap();
        assert_eq!(result.status, SwimStatus::Server);
        assert!(client.throttle().last_sent_at().is_none());

        // Still due on the very next evaluation
        let retry = client
            .send_position_if_due_at("UAL1", &pos, t0() + Duration::seconds(1))
            .unwrap();
        assert!(retry.is_ok());
        assert_eq!(client.transport().calls(), 2);
    }

    #[test]
    fn test_empty_base_url_and_zero_timeout_use_defaults() {
        let client = test_client(ClientConfig {
            base_url: String::new(),
            timeout: std::time::Duration::ZERO,
            ..config()
        });
        assert_eq!(client.config().base_url, crate::config::DEFAULT_BASE_URL);
        assert_eq!(client.config().timeout, std::time::Duration::from_secs(30));

        client.ingest_tracks(&[TrackUpdate::new("UAL1", Position::new(1.0, 2.0, 0))]);
        assert_eq!(
            client.transport().last().url,
            "https://perti.vatcscc.org/api/swim/v1/ingest/track"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = SwimClient::with_transport(
            ClientConfig {
                base_url: "not a url".to_string(),
                ..config()
            },
            FakeTransport::default(),
            ThrottleConfig::default(),
        );
        assert!(matches!(result, Err(SwimError::InvalidBaseUrl { .. })));
    }
}
