//! SWIM CLI - replay tooling for the telemetry pipeline.
//!
//! This crate provides:
//! - swim_replay: fly a scripted gate-to-gate profile through a flight session

pub mod dry_run;
pub mod sim;

pub use dry_run::DryRunTransport;
