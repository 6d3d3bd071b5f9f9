//! Flight phase estimation from telemetry and OOOI progress.

use crate::models::{FlightPhase, TelemetrySample};
use crate::oooi::OooiSnapshot;
use crate::zone::{CLIMB_MIN_VS_FPM, DESCENT_MAX_VS_FPM, PARKED_MAX_GS_KTS, TAKEOFF_MIN_GS_KTS};

/// Below this AGL an airborne aircraft is still in the terminal area.
const TERMINAL_MAX_AGL_FT: f64 = 3000.0;
/// Within this distance of the destination the flight counts as descending.
const DESCENT_DISTANCE_NM: f64 = 100.0;

/// Estimate the flight phase.
///
/// `oooi` is optional; without a detector every event is treated as not yet
/// detected.
pub fn estimate_phase(
    oooi: Option<&OooiSnapshot>,
    sample: &TelemetrySample,
    dist_to_dest_nm: f64,
) -> FlightPhase {
    let flags = oooi.copied().unwrap_or_default();

    if flags.in_detected {
        return FlightPhase::Arrived;
    }
    if flags.on_detected {
        return FlightPhase::TaxiIn;
    }

    let gs = sample.groundspeed_kts;
    let vs = sample.vertical_rate_fpm;

    if sample.on_ground {
        if gs < PARKED_MAX_GS_KTS {
            return ground_taxi_phase(&flags, FlightPhase::Preflight);
        }
        if gs >= TAKEOFF_MIN_GS_KTS {
            if flags.off_detected && !flags.on_detected {
                return FlightPhase::Landing;
            }
            return FlightPhase::Takeoff;
        }
        return ground_taxi_phase(&flags, FlightPhase::Pushback);
    }

    if sample.agl_ft < TERMINAL_MAX_AGL_FT && vs > CLIMB_MIN_VS_FPM {
        return FlightPhase::Departure;
    }
    if sample.agl_ft < TERMINAL_MAX_AGL_FT && vs < DESCENT_MAX_VS_FPM {
        return FlightPhase::Approach;
    }
    if vs < DESCENT_MAX_VS_FPM || dist_to_dest_nm < DESCENT_DISTANCE_NM {
        return FlightPhase::Descent;
    }

    FlightPhase::Enroute
}

fn ground_taxi_phase(flags: &OooiSnapshot, fallback: FlightPhase) -> FlightPhase {
    if flags.on_detected {
        FlightPhase::TaxiIn
    } else if flags.out_detected {
        FlightPhase::TaxiOut
    } else {
        fallback
    }
}
