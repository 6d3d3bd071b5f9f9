//! SWIM Client - telemetry ingestion for flight simulators
//!
//! Wraps the core detectors with a blocking HTTP client that posts track and
//! flight records to the SWIM ingest API, plus a [`FlightSession`] that
//! dispatches simulator events through the whole pipeline.

pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod session;
pub mod transport;

pub use client::{SwimClient, MAX_BATCH_ADL, MAX_BATCH_TRACKS};
pub use config::{ClientConfig, SessionConfig};
pub use error::{SwimError, SwimStatus};
pub use response::IngestResult;
pub use session::{FlightPlanInfo, FlightSession, SessionStats, SimEvent, SimFrame, TickReport};
pub use transport::{HttpTransport, PostRequest, Transport, TransportError, TransportResponse};
