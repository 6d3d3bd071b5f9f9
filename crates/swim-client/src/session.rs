//! Flight session: simulator event dispatch through the SWIM pipeline.
//!
//! A session is the caller-owned context for one active flight. Simulator
//! callbacks translate their vendor messages into [`SimEvent`]s and hand them
//! to [`FlightSession::handle`]; nothing here is global.

use crate::client::SwimClient;
use crate::config::SessionConfig;
use crate::response::IngestResult;
use crate::transport::{HttpTransport, Transport};
use chrono::{DateTime, Utc};
use swim_core::{
    estimate_phase, haversine_distance_nm, FlightIngest, FlightPhase, OooiEvent, OooiTimes,
    TelemetrySample,
};

/// Flight plan details delivered by the simulator or pilot client.
#[derive(Debug, Clone, Default)]
pub struct FlightPlanInfo {
    pub callsign: String,
    pub departure: String,
    pub destination: String,
    /// Destination coordinates, used for distance-based descent detection
    pub destination_coords: Option<(f64, f64)>,
}

/// One telemetry tick as read from the simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimFrame {
    pub sample: TelemetrySample,
    pub paused: bool,
    pub replay: bool,
}

impl From<TelemetrySample> for SimFrame {
    fn from(sample: TelemetrySample) -> Self {
        Self {
            sample,
            paused: false,
            replay: false,
        }
    }
}

/// Incoming simulator events.
#[derive(Debug, Clone)]
pub enum SimEvent {
    Telemetry(SimFrame),
    FlightPlanLoaded(FlightPlanInfo),
    Crashed,
    ReportStats,
}

/// Running counters for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub tracks_sent: u32,
    pub oooi_events_sent: u32,
    pub errors: u32,
}

/// What happened while handling one event.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub phase: FlightPhase,
    pub oooi_events: Vec<OooiEvent>,
    /// Results of OOOI submissions, one per fired event
    pub oooi_results: Vec<IngestResult>,
    /// `None` when no track was due (or tracks are disabled)
    pub track: Option<IngestResult>,
    pub skipped: bool,
}

pub struct FlightSession<T: Transport = HttpTransport> {
    client: SwimClient<T>,
    config: SessionConfig,
    destination_coords: Option<(f64, f64)>,
    phase: FlightPhase,
    stats: SessionStats,
}

impl<T: Transport> FlightSession<T> {
    pub fn new(mut client: SwimClient<T>, mut config: SessionConfig) -> Self {
        client.set_throttle_config(config.throttle);
        if client.config().api_key.is_empty() && (config.enable_tracks || config.enable_oooi) {
            tracing::warn!("No API key configured - track/OOOI reporting disabled");
            config.enable_tracks = false;
            config.enable_oooi = false;
        }
        Self {
            client,
            config,
            destination_coords: None,
            phase: FlightPhase::Unknown,
            stats: SessionStats::default(),
        }
    }

    pub fn client(&self) -> &SwimClient<T> {
        &self.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    fn has_api_key(&self) -> bool {
        !self.client.config().api_key.is_empty()
    }

    /// Turn track reporting on or off. Stays off without an API key.
    pub fn set_tracks_enabled(&mut self, enabled: bool) {
        if enabled && !self.has_api_key() {
            tracing::warn!("No API key configured - track reporting stays disabled");
        }
        self.config.enable_tracks = enabled && self.has_api_key();
        tracing::info!(
            "Track reporting {}",
            if self.config.enable_tracks { "enabled" } else { "disabled" }
        );
    }

    /// Turn OOOI reporting on or off. Stays off without an API key.
    pub fn set_oooi_enabled(&mut self, enabled: bool) {
        if enabled && !self.has_api_key() {
            tracing::warn!("No API key configured - OOOI reporting stays disabled");
        }
        self.config.enable_oooi = enabled && self.has_api_key();
        tracing::info!(
            "OOOI reporting {}",
            if self.config.enable_oooi { "enabled" } else { "disabled" }
        );
    }

    /// Dispatch one event at the current wall-clock time.
    pub fn handle(&mut self, event: SimEvent) -> TickReport {
        self.handle_at(event, Utc::now())
    }

    pub fn handle_at(&mut self, event: SimEvent, now: DateTime<Utc>) -> TickReport {
        match event {
            SimEvent::Telemetry(frame) => self.on_telemetry(&frame, now),
            SimEvent::FlightPlanLoaded(plan) => {
                self.on_flight_plan(plan);
                self.idle_report()
            }
            SimEvent::Crashed => {
                self.on_crash();
                self.idle_report()
            }
            SimEvent::ReportStats => {
                self.report_stats();
                self.idle_report()
            }
        }
    }

    fn idle_report(&self) -> TickReport {
        TickReport {
            phase: self.phase,
            ..TickReport::default()
        }
    }

    /// Start a new flight: new identity, fresh detector and throttle.
    pub fn on_flight_plan(&mut self, plan: FlightPlanInfo) {
        tracing::info!(
            "Flight plan loaded: {} {} -> {}",
            plan.callsign,
            plan.departure,
            plan.destination
        );
        if !plan.callsign.is_empty() {
            self.config.callsign = plan.callsign;
        }
        self.config.departure = plan.departure;
        self.config.destination = plan.destination;
        self.destination_coords = plan.destination_coords;
        self.client.reset_oooi();
        self.client.reset_throttle();
        self.phase = FlightPhase::Unknown;
    }

    pub fn on_crash(&mut self) {
        tracing::warn!("Aircraft crashed - resetting OOOI state for {}", self.config.callsign);
        self.client.reset_oooi();
        self.phase = FlightPhase::Unknown;
    }

    pub fn report_stats(&self) {
        tracing::info!(
            "Statistics: {} tracks sent, {} OOOI events, {} errors",
            self.stats.tracks_sent,
            self.stats.oooi_events_sent,
            self.stats.errors
        );
    }

    /// Run one telemetry tick through classifier, detector, phase estimator
    /// and throttle.
    pub fn on_telemetry(&mut self, frame: &SimFrame, now: DateTime<Utc>) -> TickReport {
        if frame.paused || frame.replay {
            return TickReport {
                phase: self.phase,
                skipped: true,
                ..TickReport::default()
            };
        }

        let sample = &frame.sample;
        let mut report = TickReport::default();

        if self.config.enable_oooi && self.client.update_oooi_at(sample, now) {
            report.oooi_events = self.client.oooi().last_events().to_vec();
        }

        let snapshot = self.client.oooi().snapshot();
        let phase = estimate_phase(Some(&snapshot), sample, self.distance_to_destination(sample));
        if phase != self.phase {
            tracing::info!("Flight phase changed: {} -> {}", self.phase, phase);
            self.phase = phase;
        }
        report.phase = phase;

        for event in &report.oooi_events {
            let result = self.submit_oooi_event(*event, sample);
            report.oooi_results.push(result);
        }

        if self.config.enable_tracks && !self.config.callsign.is_empty() {
            let callsign = self.config.callsign.clone();
            report.track = self
                .client
                .send_position_if_due_at(&callsign, &sample.position, now);
            match &report.track {
                Some(result) if result.is_ok() => self.stats.tracks_sent += 1,
                Some(_) => self.stats.errors += 1,
                None => {}
            }
        }

        report
    }

    fn distance_to_destination(&self, sample: &TelemetrySample) -> f64 {
        match self.destination_coords {
            Some((lat, lon)) => haversine_distance_nm(
                sample.position.latitude,
                sample.position.longitude,
                lat,
                lon,
            ),
            None => f64::INFINITY,
        }
    }

    fn submit_oooi_event(&mut self, event: OooiEvent, sample: &TelemetrySample) -> IngestResult {
        if self.config.callsign.is_empty() {
            self.stats.errors += 1;
            tracing::warn!("OOOI {} not submitted: no callsign", event);
            return IngestResult::invalid("Callsign is required");
        }
        let mut flight = FlightIngest::new(
            self.config.callsign.as_str(),
            self.config.departure.as_str(),
            self.config.destination.as_str(),
        );
        let time = self.client.oooi().time_of(event);
        flight.oooi = match event {
            OooiEvent::Out => OooiTimes {
                out_utc: time,
                ..OooiTimes::default()
            },
            OooiEvent::Off => OooiTimes {
                off_utc: time,
                ..OooiTimes::default()
            },
            OooiEvent::On => OooiTimes {
                on_utc: time,
                ..OooiTimes::default()
            },
            OooiEvent::In => OooiTimes {
                in_utc: time,
                ..OooiTimes::default()
            },
        };
        flight.phase = self.phase;
        flight.position = Some(sample.position);
        flight.is_active = event != OooiEvent::In;

        let result = self.client.ingest_adl(std::slice::from_ref(&flight));
        if result.is_ok() {
            self.stats.oooi_events_sent += 1;
            tracing::info!(
                "OOOI event submitted: {} = {}",
                event,
                time.map(|t| swim_core::models::format_wire_time(&t))
                    .unwrap_or_default()
            );
        } else {
            self.stats.errors += 1;
            tracing::error!("OOOI submission failed ({}): {}", event.time_field(), result.error_message);
        }
        result
    }
}
