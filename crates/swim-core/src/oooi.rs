//! OOOI (Out, Off, On, In) transition detection.
//!
//! The detector watches the stream of airport zones and stamps each
//! lifecycle event exactly once per flight. Rules are evaluated only when the
//! zone changes, and each rule requires the previous event, so the emitted
//! order is always OUT < OFF < ON < IN even when zone classification flickers.

use crate::models::{OooiTimes, TelemetrySample};
use crate::zone::{classify, AirportZone};
use chrono::{DateTime, Utc};
use std::fmt;

/// One of the four lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OooiEvent {
    Out,
    Off,
    On,
    In,
}

impl OooiEvent {
    /// Name of the flight-ingest field carrying this event's time.
    pub fn time_field(&self) -> &'static str {
        match self {
            OooiEvent::Out => "out_utc",
            OooiEvent::Off => "off_utc",
            OooiEvent::On => "on_utc",
            OooiEvent::In => "in_utc",
        }
    }
}

impl fmt::Display for OooiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OooiEvent::Out => "OUT",
            OooiEvent::Off => "OFF",
            OooiEvent::On => "ON",
            OooiEvent::In => "IN",
        };
        f.write_str(name)
    }
}

/// Read-only view of which events have been detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OooiSnapshot {
    pub out_detected: bool,
    pub off_detected: bool,
    pub on_detected: bool,
    pub in_detected: bool,
}

/// Stateful OOOI detector. One per active flight.
#[derive(Debug, Clone, Default)]
pub struct OooiDetector {
    current_zone: AirportZone,
    previous_zone: AirportZone,
    times: OooiTimes,
    out_detected: bool,
    off_detected: bool,
    on_detected: bool,
    in_detected: bool,
    last_update: Option<DateTime<Utc>>,
    last_events: Vec<OooiEvent>,
}

impl OooiDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample at the current wall-clock time.
    ///
    /// Returns true if at least one OOOI event fired.
    pub fn update(&mut self, sample: &TelemetrySample) -> bool {
        self.update_at(sample, Utc::now())
    }

    /// Feed one sample observed at `now`.
    pub fn update_at(&mut self, sample: &TelemetrySample, now: DateTime<Utc>) -> bool {
        let zone = classify(sample);
        self.update_zone_at(zone, now)
    }

    /// Feed an already-classified zone observed at `now`.
    pub fn update_zone_at(&mut self, new_zone: AirportZone, now: DateTime<Utc>) -> bool {
        self.last_events.clear();
        self.last_update = Some(now);

        if new_zone == self.current_zone {
            return false;
        }

        self.previous_zone = self.current_zone;
        self.current_zone = new_zone;
        let previous = self.previous_zone;

        tracing::debug!("Zone change {:?} -> {:?}", previous, new_zone);

        // Pushback complete or moving under own power
        if !self.out_detected
            && previous == AirportZone::Parking
            && matches!(new_zone, AirportZone::Taxiway | AirportZone::Hold)
        {
            self.times.out_utc = Some(now);
            self.out_detected = true;
            self.last_events.push(OooiEvent::Out);
        }

        // Wheels up
        if !self.off_detected
            && self.out_detected
            && matches!(previous, AirportZone::Runway | AirportZone::Taxiway)
            && new_zone == AirportZone::Airborne
        {
            self.times.off_utc = Some(now);
            self.off_detected = true;
            self.last_events.push(OooiEvent::Off);
        }

        // Wheels down
        if !self.on_detected
            && self.off_detected
            && previous.is_airborne()
            && matches!(new_zone, AirportZone::Runway | AirportZone::Taxiway)
        {
            self.times.on_utc = Some(now);
            self.on_detected = true;
            self.last_events.push(OooiEvent::On);
        }

        // Arrived at the gate
        if !self.in_detected
            && self.on_detected
            && matches!(previous, AirportZone::Taxiway | AirportZone::Hold)
            && new_zone == AirportZone::Parking
        {
            self.times.in_utc = Some(now);
            self.in_detected = true;
            self.last_events.push(OooiEvent::In);
        }

        for event in &self.last_events {
            tracing::info!("OOOI {} detected at {}", event, now);
        }

        !self.last_events.is_empty()
    }

    /// Reinitialize for a new flight.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True once all four events have been detected.
    pub fn is_complete(&self) -> bool {
        self.out_detected && self.off_detected && self.on_detected && self.in_detected
    }

    pub fn times(&self) -> OooiTimes {
        self.times
    }

    pub fn snapshot(&self) -> OooiSnapshot {
        OooiSnapshot {
            out_detected: self.out_detected,
            off_detected: self.off_detected,
            on_detected: self.on_detected,
            in_detected: self.in_detected,
        }
    }

    pub fn current_zone(&self) -> AirportZone {
        self.current_zone
    }

    pub fn previous_zone(&self) -> AirportZone {
        self.previous_zone
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Events fired by the most recent update, in detection order.
    pub fn last_events(&self) -> &[OooiEvent] {
        &self.last_events
    }

    /// Time recorded for a given event, if detected.
    pub fn time_of(&self, event: OooiEvent) -> Option<DateTime<Utc>> {
        match event {
            OooiEvent::Out => self.times.out_utc,
            OooiEvent::Off => self.times.off_utc,
            OooiEvent::On => self.times.on_utc,
            OooiEvent::In => self.times.in_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 14, 0, 0).unwrap()
    }

    fn ground(gs: f64, brake: bool) -> TelemetrySample {
        TelemetrySample {
            groundspeed_kts: gs,
            on_ground: true,
            parking_brake: brake,
            ..TelemetrySample::default()
        }
    }

    fn air(gs: f64, agl: f64, vs: f64) -> TelemetrySample {
        TelemetrySample {
            groundspeed_kts: gs,
            vertical_rate_fpm: vs,
            agl_ft: agl,
            on_ground: false,
            ..TelemetrySample::default()
        }
    }

    #[test]
    fn test_full_gate_to_gate_sequence() {
        let mut detector = OooiDetector::new();
        let mut fired = 0;
        let sequence = [
            (ground(0.0, true), AirportZone::Parking, None),
            (ground(0.0, false), AirportZone::Hold, Some(OooiEvent::Out)),
            (ground(15.0, false), AirportZone::Taxiway, None),
            (ground(80.0, false), AirportZone::Runway, None),
            (air(150.0, 100.0, 2000.0), AirportZone::Airborne, Some(OooiEvent::Off)),
            (air(250.0, 2500.0, -800.0), AirportZone::Approach, None),
            (air(140.0, 400.0, -700.0), AirportZone::Final, None),
            (
                TelemetrySample {
                    on_ground: true,
                    ..air(140.0, 0.0, -500.0)
                },
                AirportZone::Runway,
                Some(OooiEvent::On),
            ),
            (ground(20.0, false), AirportZone::Taxiway, None),
            (ground(0.0, true), AirportZone::Parking, Some(OooiEvent::In)),
        ];

        for (i, (sample, zone, event)) in sequence.iter().enumerate() {
            assert!(!detector.is_complete(), "complete too early at step {i}");
            let hit = detector.update_at(sample, t0() + Duration::seconds(60 * i as i64));
            assert_eq!(detector.current_zone(), *zone, "zone at step {i}");
            assert_eq!(hit, event.is_some(), "event at step {i}");
            if let Some(event) = event {
                assert_eq!(detector.last_events(), &[*event]);
                fired += 1;
            }
        }

        assert_eq!(fired, 4);
        assert!(detector.is_complete());
        let times = detector.times();
        assert_eq!(times.out_utc, Some(t0() + Duration::seconds(60)));
        assert_eq!(times.in_utc, Some(t0() + Duration::seconds(540)));
    }

    #[test]
    fn test_taxi_from_hold_is_not_out() {
        let mut detector = OooiDetector::new();
        detector.update_at(&ground(0.0, false), t0());
        assert!(!detector.update_at(&ground(15.0, false), t0()));
        assert!(detector.times().out_utc.is_none());
    }

    #[test]
    fn test_same_zone_only_touches_last_update() {
        let mut detector = OooiDetector::new();
        detector.update_at(&ground(0.0, true), t0());
        let later = t0() + Duration::seconds(30);
        assert!(!detector.update_at(&ground(1.0, true), later));
        assert_eq!(detector.current_zone(), AirportZone::Parking);
        assert_eq!(detector.previous_zone(), AirportZone::Unknown);
        assert_eq!(detector.last_update(), Some(later));
    }

    #[test]
    fn test_times_never_overwritten() {
        let mut detector = OooiDetector::new();
        detector.update_zone_at(AirportZone::Parking, t0());
        detector.update_zone_at(AirportZone::Taxiway, t0() + Duration::seconds(1));
        let out = detector.times().out_utc;
        assert_eq!(out, Some(t0() + Duration::seconds(1)));

        // Flicker back to the gate and out again
        detector.update_zone_at(AirportZone::Parking, t0() + Duration::seconds(2));
        assert!(!detector.update_zone_at(AirportZone::Taxiway, t0() + Duration::seconds(3)));
        assert_eq!(detector.times().out_utc, out);
    }

    #[test]
    fn test_off_requires_out() {
        let mut detector = OooiDetector::new();
        detector.update_zone_at(AirportZone::Runway, t0());
        assert!(!detector.update_zone_at(AirportZone::Airborne, t0()));
        assert!(detector.times().off_utc.is_none());
    }

    #[test]
    fn test_on_requires_off_and_in_requires_on() {
        let mut detector = OooiDetector::new();
        detector.update_zone_at(AirportZone::Final, t0());
        assert!(!detector.update_zone_at(AirportZone::Runway, t0()));
        detector.update_zone_at(AirportZone::Taxiway, t0());
        assert!(!detector.update_zone_at(AirportZone::Parking, t0()));
        assert_eq!(detector.times(), OooiTimes::default());
    }

    #[test]
    fn test_skipped_state_fires_only_out() {
        let mut detector = OooiDetector::new();
        detector.update_zone_at(AirportZone::Parking, t0());
        // Parking -> Airborne matches neither OUT nor OFF
        assert!(!detector.update_zone_at(AirportZone::Airborne, t0()));

        let mut detector = OooiDetector::new();
        detector.update_zone_at(AirportZone::Parking, t0());
        assert!(detector.update_zone_at(AirportZone::Taxiway, t0()));
        // Taxiway -> Airborne directly still fires OFF
        assert!(detector.update_zone_at(AirportZone::Airborne, t0()));
        assert_eq!(detector.last_events(), &[OooiEvent::Off]);
    }

    #[test]
    fn test_ordering_invariant_under_noise() {
        use AirportZone::*;
        let zones = [
            Unknown, Parking, Hold, Parking, Taxiway, Hold, Taxiway, Runway, Taxiway, Runway,
            Airborne, Approach, Airborne, Final, Runway, Airborne, Final, Taxiway, Runway,
            Taxiway, Parking, Taxiway, Parking,
        ];
        let mut detector = OooiDetector::new();
        let mut seen = Vec::new();
        for (i, zone) in zones.iter().enumerate() {
            detector.update_zone_at(*zone, t0() + Duration::seconds(i as i64));
            seen.extend_from_slice(detector.last_events());
        }
        assert_eq!(
            seen,
            vec![OooiEvent::Out, OooiEvent::Off, OooiEvent::On, OooiEvent::In]
        );
        let times = detector.times();
        assert!(times.out_utc < times.off_utc);
        assert!(times.off_utc < times.on_utc);
        assert!(times.on_utc < times.in_utc);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut detector = OooiDetector::new();
        detector.update_zone_at(AirportZone::Parking, t0());
        detector.update_zone_at(AirportZone::Taxiway, t0());
        detector.reset();

        assert_eq!(detector.current_zone(), AirportZone::Unknown);
        assert_eq!(detector.previous_zone(), AirportZone::Unknown);
        assert_eq!(detector.times(), OooiTimes::default());
        assert_eq!(detector.snapshot(), OooiSnapshot::default());
        assert!(detector.last_update().is_none());
        assert!(detector.last_events().is_empty());
        assert!(!detector.is_complete());
    }
}
