//! Simulated telemetry sources.

mod profile;

pub use profile::{Airfield, FlightProfile, GateToGate, Leg, LegKind};
