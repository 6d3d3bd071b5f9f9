//! Core data models for SWIM telemetry ingestion.
//!
//! Domain types are plain snapshots. The wire encoding for the ingest API is
//! sparse: a field is emitted only when it carries a non-default value, so a
//! legitimate zero is indistinguishable on the wire from an absent field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Timestamp format used on the wire (`2026-01-16T12:00:00Z`).
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Aircraft position snapshot produced by the simulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees (-90..=90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180..=180)
    pub longitude: f64,
    /// Altitude in feet MSL
    #[serde(default)]
    pub altitude_ft: i32,
    /// Heading in degrees (0-359)
    #[serde(default)]
    pub heading_deg: i32,
    #[serde(default)]
    pub groundspeed_kts: i32,
    /// Vertical rate in feet per minute (negative = descending)
    #[serde(default)]
    pub vertical_rate_fpm: i32,
    #[serde(default)]
    pub true_airspeed_kts: i32,
    #[serde(default)]
    pub mach_number: f64,
    #[serde(default)]
    pub on_ground: bool,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude_ft: i32) -> Self {
        Self {
            latitude,
            longitude,
            altitude_ft,
            ..Self::default()
        }
    }

    /// True when latitude and longitude are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One evaluation tick of simulator telemetry.
///
/// Kinematics are kept as floats so zone thresholds are compared at the
/// precision the simulator reports them; `position` is the integer snapshot
/// that gets transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub position: Position,
    pub groundspeed_kts: f64,
    pub vertical_rate_fpm: f64,
    /// Altitude above ground level in feet
    pub agl_ft: f64,
    pub on_ground: bool,
    pub parking_brake: bool,
}

impl TelemetrySample {
    /// Build a sample whose kinematics mirror the position record.
    pub fn new(position: Position, agl_ft: f64, parking_brake: bool) -> Self {
        Self {
            position,
            groundspeed_kts: f64::from(position.groundspeed_kts),
            vertical_rate_fpm: f64::from(position.vertical_rate_fpm),
            agl_ft,
            on_ground: position.on_ground,
            parking_brake,
        }
    }
}

/// The four OOOI lifecycle timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OooiTimes {
    /// Gate out (pushback)
    pub out_utc: Option<DateTime<Utc>>,
    /// Wheels off
    pub off_utc: Option<DateTime<Utc>>,
    /// Wheels on
    pub on_utc: Option<DateTime<Utc>>,
    /// Gate in
    pub in_utc: Option<DateTime<Utc>>,
}

impl OooiTimes {
    pub fn is_empty(&self) -> bool {
        self.out_utc.is_none()
            && self.off_utc.is_none()
            && self.on_utc.is_none()
            && self.in_utc.is_none()
    }
}

/// Derived flight phase reported to the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightPhase {
    #[default]
    Unknown,
    Preflight,
    Pushback,
    TaxiOut,
    Takeoff,
    Departure,
    Enroute,
    Descent,
    Approach,
    Landing,
    TaxiIn,
    Arrived,
}

impl FlightPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightPhase::Unknown => "UNKNOWN",
            FlightPhase::Preflight => "PREFLIGHT",
            FlightPhase::Pushback => "PUSHBACK",
            FlightPhase::TaxiOut => "TAXI_OUT",
            FlightPhase::Takeoff => "TAKEOFF",
            FlightPhase::Departure => "DEPARTURE",
            FlightPhase::Enroute => "ENROUTE",
            FlightPhase::Descent => "DESCENT",
            FlightPhase::Approach => "APPROACH",
            FlightPhase::Landing => "LANDING",
            FlightPhase::TaxiIn => "TAXI_IN",
            FlightPhase::Arrived => "ARRIVED",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single position report for `/ingest/track`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackUpdate {
    pub callsign: String,
    pub position: Position,
    /// Transponder code, empty when unknown
    pub squawk: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TrackUpdate {
    pub fn new(callsign: impl Into<String>, position: Position) -> Self {
        Self {
            callsign: callsign.into(),
            position,
            squawk: String::new(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A flight-level record for `/ingest/adl`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightIngest {
    pub callsign: String,
    pub dept_icao: String,
    pub dest_icao: String,
    /// VATSIM CID
    pub cid: Option<u32>,
    pub aircraft_type: String,
    pub route: String,
    pub cruise_altitude_ft: i32,
    pub cruise_speed_kts: i32,
    pub position: Option<Position>,
    pub oooi: OooiTimes,
    pub eta_utc: Option<DateTime<Utc>>,
    pub etd_utc: Option<DateTime<Utc>>,
    pub phase: FlightPhase,
    pub is_active: bool,
}

impl FlightIngest {
    pub fn new(
        callsign: impl Into<String>,
        dept_icao: impl Into<String>,
        dest_icao: impl Into<String>,
    ) -> Self {
        Self {
            callsign: callsign.into(),
            dept_icao: dept_icao.into(),
            dest_icao: dest_icao.into(),
            is_active: true,
            ..Self::default()
        }
    }
}

// ========== WIRE ENCODING ==========

#[derive(Serialize)]
struct TrackWire<'a> {
    callsign: &'a str,
    #[serde(serialize_with = "serialize_coord")]
    latitude: f64,
    #[serde(serialize_with = "serialize_coord")]
    longitude: f64,
    #[serde(skip_serializing_if = "is_zero")]
    altitude_ft: i32,
    #[serde(skip_serializing_if = "is_zero")]
    ground_speed_kts: i32,
    #[serde(skip_serializing_if = "is_zero")]
    true_airspeed_kts: i32,
    #[serde(skip_serializing_if = "is_zero")]
    heading_deg: i32,
    #[serde(skip_serializing_if = "is_zero")]
    vertical_rate_fpm: i32,
    #[serde(skip_serializing_if = "str::is_empty")]
    squawk: &'a str,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    timestamp: Option<DateTime<Utc>>,
}

impl Serialize for TrackUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TrackWire {
            callsign: &self.callsign,
            latitude: self.position.latitude,
            longitude: self.position.longitude,
            altitude_ft: self.position.altitude_ft,
            ground_speed_kts: self.position.groundspeed_kts,
            true_airspeed_kts: self.position.true_airspeed_kts,
            heading_deg: self.position.heading_deg,
            vertical_rate_fpm: self.position.vertical_rate_fpm,
            squawk: &self.squawk,
            timestamp: self.timestamp,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct AdlPositionWire {
    #[serde(serialize_with = "serialize_coord")]
    latitude: f64,
    #[serde(serialize_with = "serialize_coord")]
    longitude: f64,
    altitude: i32,
    groundspeed: i32,
    heading: i32,
    vertical_rate_fpm: i32,
    #[serde(skip_serializing_if = "is_zero")]
    true_airspeed_kts: i32,
    #[serde(skip_serializing_if = "is_zero_f64", serialize_with = "serialize_mach")]
    mach_number: f64,
}

#[derive(Serialize)]
struct FlightWire<'a> {
    callsign: &'a str,
    dept_icao: &'a str,
    dest_icao: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cid: Option<u32>,
    #[serde(skip_serializing_if = "str::is_empty")]
    aircraft_type: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    route: &'a str,
    #[serde(skip_serializing_if = "is_not_positive")]
    cruise_altitude: i32,
    #[serde(skip_serializing_if = "is_not_positive")]
    cruise_speed: i32,
    #[serde(flatten)]
    position: Option<AdlPositionWire>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    out_utc: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    off_utc: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    on_utc: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    in_utc: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    eta_utc: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_wire_time"
    )]
    etd_utc: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "is_unknown_phase")]
    phase: FlightPhase,
    is_active: bool,
}

impl Serialize for FlightIngest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let position = self
            .position
            .filter(Position::is_valid)
            .map(|p| AdlPositionWire {
                latitude: p.latitude,
                longitude: p.longitude,
                altitude: p.altitude_ft,
                groundspeed: p.groundspeed_kts,
                heading: p.heading_deg,
                vertical_rate_fpm: p.vertical_rate_fpm,
                true_airspeed_kts: p.true_airspeed_kts,
                mach_number: p.mach_number,
            });

        FlightWire {
            callsign: &self.callsign,
            dept_icao: &self.dept_icao,
            dest_icao: &self.dest_icao,
            cid: self.cid.filter(|cid| *cid > 0),
            aircraft_type: &self.aircraft_type,
            route: &self.route,
            cruise_altitude: self.cruise_altitude_ft,
            cruise_speed: self.cruise_speed_kts,
            position,
            out_utc: self.oooi.out_utc,
            off_utc: self.oooi.off_utc,
            on_utc: self.oooi.on_utc,
            in_utc: self.oooi.in_utc,
            eta_utc: self.eta_utc,
            etd_utc: self.etd_utc,
            phase: self.phase,
            is_active: self.is_active,
        }
        .serialize(serializer)
    }
}

/// Format a UTC instant the way the ingest API expects.
pub fn format_wire_time(time: &DateTime<Utc>) -> String {
    time.format(WIRE_TIME_FORMAT).to_string()
}

fn serialize_wire_time<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(time) => serializer.serialize_str(&format_wire_time(time)),
        None => serializer.serialize_none(),
    }
}

fn serialize_coord<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 6))
}

fn serialize_mach<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 3))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

fn is_zero_f64(value: &f64) -> bool {
    *value <= 0.0
}

fn is_not_positive(value: &i32) -> bool {
    *value <= 0
}

fn is_unknown_phase(phase: &FlightPhase) -> bool {
    *phase == FlightPhase::Unknown
}
