//! SWIM Core - flight telemetry interpretation
//!
//! Turns raw simulator telemetry into airport zones, OOOI lifecycle events,
//! flight phases, and throttled position reports. Everything here is
//! synchronous and free of I/O; transmission lives in `swim-client`.

pub mod models;
pub mod oooi;
pub mod phase;
pub mod spatial;
pub mod throttle;
pub mod zone;

pub use models::{
    FlightIngest, FlightPhase, OooiTimes, Position, TelemetrySample, TrackUpdate,
};
pub use oooi::{OooiDetector, OooiEvent, OooiSnapshot};
pub use phase::estimate_phase;
pub use spatial::{haversine_distance_nm, planar_distance_nm};
pub use throttle::{PositionThrottle, ThrottleConfig};
pub use zone::{classify, AirportZone};
