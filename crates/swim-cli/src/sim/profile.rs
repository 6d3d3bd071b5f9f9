//! Scripted gate-to-gate flight profiles.

use swim_core::{Position, TelemetrySample};

/// Trait for telemetry sources driven by elapsed time.
pub trait FlightProfile: Send + Sync {
    /// Telemetry at `t` seconds from the start of the profile.
    fn sample_at(&self, t: f64) -> TelemetrySample;

    /// Total length of the profile in seconds.
    fn duration_secs(&self) -> f64;
}

/// An airport reference point: latitude, longitude, field elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Airfield {
    pub lat: f64,
    pub lon: f64,
    pub elevation_ft: i32,
}

impl Airfield {
    pub fn new(lat: f64, lon: f64, elevation_ft: i32) -> Self {
        Self {
            lat,
            lon,
            elevation_ft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    /// At the gate, brake set
    Parked,
    /// Pushback complete, brake released, stopped
    Pushback,
    TaxiOut,
    TakeoffRoll,
    Climb,
    Cruise,
    Descent,
    Approach,
    Final,
    Rollout,
    TaxiIn,
    /// At the arrival gate, brake set
    Shutdown,
}

impl LegKind {
    fn is_airborne(&self) -> bool {
        matches!(
            self,
            LegKind::Climb | LegKind::Cruise | LegKind::Descent | LegKind::Approach | LegKind::Final
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub kind: LegKind,
    pub duration_secs: f64,
}

impl Leg {
    pub fn new(kind: LegKind, duration_secs: f64) -> Self {
        Self {
            kind,
            duration_secs,
        }
    }
}

// Heights above the field bounding the airborne legs
const LIFTOFF_AGL_FT: f64 = 60.0;
const APPROACH_GATE_AGL_FT: f64 = 3500.0;
const FINAL_FIX_AGL_FT: f64 = 1000.0;

/// A complete flight from one gate to another along a straight route.
pub struct GateToGate {
    pub origin: Airfield,
    pub destination: Airfield,
    pub cruise_agl_ft: f64,
    legs: Vec<Leg>,
    airborne_start: f64,
    airborne_secs: f64,
    heading_deg: f64,
}

impl GateToGate {
    pub fn new(origin: Airfield, destination: Airfield, cruise_agl_ft: f64, legs: Vec<Leg>) -> Self {
        let mut airborne_start = 0.0;
        let mut airborne_secs = 0.0;
        let mut elapsed = 0.0;
        for leg in &legs {
            if leg.kind.is_airborne() {
                if airborne_secs == 0.0 {
                    airborne_start = elapsed;
                }
                airborne_secs += leg.duration_secs;
            }
            elapsed += leg.duration_secs;
        }

        let dlat = destination.lat - origin.lat;
        let dlon = (destination.lon - origin.lon) * origin.lat.to_radians().cos();
        let heading = dlon.atan2(dlat).to_degrees();
        let heading_deg = if heading < 0.0 { heading + 360.0 } else { heading };

        Self {
            origin,
            destination,
            cruise_agl_ft,
            legs,
            airborne_start,
            airborne_secs,
            heading_deg,
        }
    }

    /// A short-haul flight with a compressed timeline.
    pub fn standard(origin: Airfield, destination: Airfield) -> Self {
        let legs = vec![
            Leg::new(LegKind::Parked, 30.0),
            Leg::new(LegKind::Pushback, 20.0),
            Leg::new(LegKind::TaxiOut, 120.0),
            Leg::new(LegKind::TakeoffRoll, 30.0),
            Leg::new(LegKind::Climb, 600.0),
            Leg::new(LegKind::Cruise, 1200.0),
            Leg::new(LegKind::Descent, 600.0),
            Leg::new(LegKind::Approach, 180.0),
            Leg::new(LegKind::Final, 90.0),
            Leg::new(LegKind::Rollout, 30.0),
            Leg::new(LegKind::TaxiIn, 120.0),
            Leg::new(LegKind::Shutdown, 30.0),
        ];
        Self::new(origin, destination, 33_000.0, legs)
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Leg active at `t` and the fraction of it already flown.
    fn leg_at(&self, t: f64) -> Option<(LegKind, f64)> {
        let mut start = 0.0;
        for leg in &self.legs {
            let end = start + leg.duration_secs;
            if t < end {
                let frac = if leg.duration_secs > 0.0 {
                    (t - start) / leg.duration_secs
                } else {
                    0.0
                };
                return Some((leg.kind, frac.clamp(0.0, 1.0)));
            }
            start = end;
        }
        self.legs.last().map(|leg| (leg.kind, 1.0))
    }

    fn leg_secs(&self, kind: LegKind) -> f64 {
        self.legs
            .iter()
            .find(|leg| leg.kind == kind)
            .map(|leg| leg.duration_secs)
            .filter(|secs| *secs > 0.0)
            .unwrap_or(1.0)
    }

    /// Fraction of the route covered, driven by airborne time.
    fn route_progress(&self, t: f64) -> f64 {
        if self.airborne_secs <= 0.0 {
            return 0.0;
        }
        ((t - self.airborne_start) / self.airborne_secs).clamp(0.0, 1.0)
    }
}

fn lerp(from: f64, to: f64, frac: f64) -> f64 {
    from + (to - from) * frac
}

impl FlightProfile for GateToGate {
    fn sample_at(&self, t: f64) -> TelemetrySample {
        let Some((kind, frac)) = self.leg_at(t) else {
            return TelemetrySample::default();
        };

        // (groundspeed kts, vertical rate fpm, agl ft, on ground, brake)
        let (gs, vs, agl, on_ground, brake) = match kind {
            LegKind::Parked | LegKind::Shutdown => (0.0, 0.0, 0.0, true, true),
            LegKind::Pushback => (0.0, 0.0, 0.0, true, false),
            LegKind::TaxiOut | LegKind::TaxiIn => (15.0, 0.0, 0.0, true, false),
            LegKind::TakeoffRoll => (lerp(30.0, 150.0, frac), 0.0, 0.0, true, false),
            LegKind::Climb => {
                let rate = (self.cruise_agl_ft - LIFTOFF_AGL_FT) / self.leg_secs(kind) * 60.0;
                let agl = lerp(LIFTOFF_AGL_FT, self.cruise_agl_ft, frac);
                (lerp(160.0, 450.0, frac), rate, agl, false, false)
            }
            LegKind::Cruise => (450.0, 0.0, self.cruise_agl_ft, false, false),
            LegKind::Descent => {
                let rate = (APPROACH_GATE_AGL_FT - self.cruise_agl_ft) / self.leg_secs(kind) * 60.0;
                let agl = lerp(self.cruise_agl_ft, APPROACH_GATE_AGL_FT, frac);
                (lerp(450.0, 250.0, frac), rate, agl, false, false)
            }
            LegKind::Approach => {
                let rate = (FINAL_FIX_AGL_FT - APPROACH_GATE_AGL_FT) / self.leg_secs(kind) * 60.0;
                let agl = lerp(APPROACH_GATE_AGL_FT, FINAL_FIX_AGL_FT, frac);
                (lerp(250.0, 160.0, frac), rate, agl, false, false)
            }
            LegKind::Final => {
                let rate = (LIFTOFF_AGL_FT - FINAL_FIX_AGL_FT) / self.leg_secs(kind) * 60.0;
                let agl = lerp(FINAL_FIX_AGL_FT, LIFTOFF_AGL_FT, frac);
                (140.0, rate, agl, false, false)
            }
            LegKind::Rollout => (lerp(140.0, 20.0, frac), 0.0, 0.0, true, false),
        };

        let progress = self.route_progress(t);
        let lat = lerp(self.origin.lat, self.destination.lat, progress);
        let lon = lerp(self.origin.lon, self.destination.lon, progress);
        let field_ft = if progress < 0.5 {
            self.origin.elevation_ft
        } else {
            self.destination.elevation_ft
        };

        let mut position = Position::new(lat, lon, field_ft + agl.round() as i32);
        position.heading_deg = self.heading_deg.round() as i32 % 360;
        position.groundspeed_kts = gs.round() as i32;
        position.vertical_rate_fpm = vs.round() as i32;
        position.on_ground = on_ground;
        if !on_ground {
            position.true_airspeed_kts = position.groundspeed_kts;
        }

        TelemetrySample {
            groundspeed_kts: gs,
            vertical_rate_fpm: vs,
            ..TelemetrySample::new(position, agl, brake)
        }
    }

    fn duration_secs(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration_secs).sum()
    }
}
