//! Airport zone classification from a single telemetry sample.

use crate::models::TelemetrySample;

/// Max ground speed (knots) for the aircraft to count as parked or holding.
pub const PARKED_MAX_GS_KTS: f64 = 5.0;
/// Min ground speed (knots) for taxi.
pub const TAXI_MIN_GS_KTS: f64 = 3.0;
/// Min ground speed (knots) for a takeoff or landing roll.
pub const TAKEOFF_MIN_GS_KTS: f64 = 60.0;
/// Min AGL (feet) to be considered airborne.
pub const AIRBORNE_MIN_AGL_FT: f64 = 50.0;
/// Max AGL (feet) for the approach zone.
pub const APPROACH_MAX_AGL_FT: f64 = 3000.0;
/// Max AGL (feet) for the final zone.
pub const FINAL_MAX_AGL_FT: f64 = 1000.0;
/// Descent rate (fpm) below which the aircraft is descending with intent.
pub const DESCENT_MAX_VS_FPM: f64 = -300.0;
/// Climb rate (fpm) above which the aircraft is climbing with intent.
pub const CLIMB_MIN_VS_FPM: f64 = 300.0;

/// Discrete airport-area classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AirportZone {
    #[default]
    Unknown,
    Parking,
    Taxiway,
    Hold,
    Runway,
    Airborne,
    Approach,
    Final,
}

impl AirportZone {
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            AirportZone::Airborne | AirportZone::Approach | AirportZone::Final
        )
    }
}

/// Classify a telemetry sample into an airport zone.
///
/// Total and deterministic. Airborne rules are checked first, then ground
/// rules in priority order. A sample that is neither on the ground nor above
/// the airborne threshold (e.g. `on_ground == false` at 30 ft AGL) is
/// `Unknown`.
pub fn classify(sample: &TelemetrySample) -> AirportZone {
    let gs = sample.groundspeed_kts;
    let agl = sample.agl_ft;
    let vs = sample.vertical_rate_fpm;

    if !sample.on_ground && agl > AIRBORNE_MIN_AGL_FT {
        if agl <= FINAL_MAX_AGL_FT && vs < DESCENT_MAX_VS_FPM {
            return AirportZone::Final;
        }
        if agl <= APPROACH_MAX_AGL_FT && vs < 0.0 {
            return AirportZone::Approach;
        }
        return AirportZone::Airborne;
    }

    if sample.on_ground {
        if gs < PARKED_MAX_GS_KTS && sample.parking_brake {
            return AirportZone::Parking;
        }
        if gs >= TAKEOFF_MIN_GS_KTS {
            return AirportZone::Runway;
        }
        if gs >= TAXI_MIN_GS_KTS {
            return AirportZone::Taxiway;
        }
        // Stopped without the brake: holding short or waiting in line
        if !sample.parking_brake && gs < PARKED_MAX_GS_KTS {
            return AirportZone::Hold;
        }
        return AirportZone::Parking;
    }

    AirportZone::Unknown
}
