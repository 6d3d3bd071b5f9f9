//! Replay a scripted gate-to-gate flight through the SWIM pipeline.
//!
//! Runs on a simulated clock: the full profile completes in moments unless
//! `--realtime` is given.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use swim_cli::sim::{Airfield, FlightProfile, GateToGate};
use swim_cli::DryRunTransport;
use swim_client::{
    ClientConfig, FlightPlanInfo, FlightSession, SessionConfig, SimEvent, SwimClient, Transport,
};
use swim_core::ThrottleConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fly a simulated flight and report it to the SWIM ingest API
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SWIM API base URL (default: SWIM_BASE_URL or the public endpoint)
    #[arg(long)]
    base_url: Option<String>,

    /// API key (default: SWIM_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Value for the X-SWIM-Source header
    #[arg(long, default_value = "swim_replay")]
    source: String,

    #[arg(long, default_value = "DAL1402")]
    callsign: String,

    #[arg(long, default_value = "KATL")]
    departure: String,

    #[arg(long, default_value = "KMCO")]
    destination: String,

    /// Departure airfield latitude
    #[arg(long, default_value_t = 33.6407)]
    dep_lat: f64,

    /// Departure airfield longitude
    #[arg(long, default_value_t = -84.4277)]
    dep_lon: f64,

    /// Departure field elevation in feet
    #[arg(long, default_value_t = 1026)]
    dep_elev: i32,

    /// Destination airfield latitude
    #[arg(long, default_value_t = 28.4294)]
    dest_lat: f64,

    /// Destination airfield longitude
    #[arg(long, default_value_t = -81.3089)]
    dest_lon: f64,

    /// Destination field elevation in feet
    #[arg(long, default_value_t = 96)]
    dest_elev: i32,

    /// Simulated seconds between telemetry ticks
    #[arg(long, default_value_t = 1.0)]
    step: f64,

    /// Minimum seconds between position reports
    #[arg(long, default_value_t = 5)]
    interval: u32,

    /// Sleep between ticks instead of running on a simulated clock
    #[arg(long)]
    realtime: bool,

    /// Log requests instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("swim_client=debug".parse()?)
        .add_directive("swim_core=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs)?;

    let mut config = ClientConfig::from_env();
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.api_key = key.clone();
    }
    config.source_id = args.source.clone();

    let session_config = SessionConfig {
        callsign: args.callsign.clone(),
        departure: args.departure.clone(),
        destination: args.destination.clone(),
        throttle: ThrottleConfig {
            interval_secs: args.interval,
            ..ThrottleConfig::default()
        },
        ..SessionConfig::default()
    };

    let profile = GateToGate::standard(
        Airfield::new(args.dep_lat, args.dep_lon, args.dep_elev),
        Airfield::new(args.dest_lat, args.dest_lon, args.dest_elev),
    );

    if args.dry_run {
        if config.api_key.is_empty() {
            config.api_key = "dry-run".to_string();
        }
        let client =
            SwimClient::with_transport(config, DryRunTransport::new(), session_config.throttle)
                .context("failed to set up dry-run client")?;
        replay(FlightSession::new(client, session_config), &profile, &args)
    } else {
        println!("Connecting to SWIM API at {}...", config.base_url());
        let client = SwimClient::new(config).context("failed to create SWIM client")?;
        replay(FlightSession::new(client, session_config), &profile, &args)
    }
}

fn replay<T: Transport>(
    mut session: FlightSession<T>,
    profile: &GateToGate,
    args: &Args,
) -> anyhow::Result<()> {
    anyhow::ensure!(args.step > 0.0, "--step must be positive");

    let start: DateTime<Utc> = Utc::now();
    session.handle_at(
        SimEvent::FlightPlanLoaded(FlightPlanInfo {
            callsign: args.callsign.clone(),
            departure: args.departure.clone(),
            destination: args.destination.clone(),
            destination_coords: Some((profile.destination.lat, profile.destination.lon)),
        }),
        start,
    );

    println!(
        "Replaying {} {} -> {} ({:.0}s of flight, step {}s)",
        args.callsign,
        args.departure,
        args.destination,
        profile.duration_secs(),
        args.step
    );
    println!();

    let mut t = 0.0;
    while t < profile.duration_secs() {
        let now = start + Duration::milliseconds((t * 1000.0) as i64);
        let report = session.handle_at(SimEvent::Telemetry(profile.sample_at(t).into()), now);

        for (event, result) in report.oooi_events.iter().zip(&report.oooi_results) {
            let outcome = if result.is_ok() { "OK".to_string() } else { result.error_message.clone() };
            println!("[{:6.0}s] {:<3} ({}) -> {}", t, event.to_string(), report.phase, outcome);
        }
        if let Some(track) = report.track.as_ref().filter(|r| !r.is_ok()) {
            eprintln!("[{:6.0}s] Track rejected: {}", t, track.error_message);
        }

        if args.realtime {
            std::thread::sleep(std::time::Duration::from_secs_f64(args.step));
        }
        t += args.step;
    }

    session.handle_at(SimEvent::ReportStats, Utc::now());
    let stats = session.stats();
    println!(
        "\nReplay complete. Sent {} position updates, {} OOOI events ({} errors).",
        stats.tracks_sent, stats.oooi_events_sent, stats.errors
    );
    Ok(())
}
