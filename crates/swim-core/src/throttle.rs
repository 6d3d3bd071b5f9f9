//! Position update throttling.
//!
//! Decides whether a position is worth transmitting. The remote side still
//! receives a heartbeat for a stationary aircraft: once three intervals have
//! elapsed a report is forced regardless of movement.

use crate::models::Position;
use crate::spatial::planar_distance_nm;
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_INTERVAL_SECS: u32 = 5;
pub const DEFAULT_DISTANCE_NM: f64 = 0.5;
pub const DEFAULT_ALTITUDE_CHANGE_FT: i32 = 100;

/// Heartbeat multiple of the interval after which a report is forced.
const FORCE_SEND_INTERVALS: i64 = 3;

/// Throttle thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleConfig {
    /// Minimum seconds between updates
    pub interval_secs: u32,
    /// Minimum horizontal movement (nm) to trigger an update
    pub distance_nm: f64,
    /// Minimum altitude change (ft) to trigger an update
    pub altitude_change_ft: i32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            distance_nm: DEFAULT_DISTANCE_NM,
            altitude_change_ft: DEFAULT_ALTITUDE_CHANGE_FT,
        }
    }
}

impl ThrottleConfig {
    /// Replace non-positive thresholds with the defaults.
    pub fn normalized(self) -> Self {
        Self {
            interval_secs: if self.interval_secs > 0 {
                self.interval_secs
            } else {
                DEFAULT_INTERVAL_SECS
            },
            distance_nm: if self.distance_nm > 0.0 {
                self.distance_nm
            } else {
                DEFAULT_DISTANCE_NM
            },
            altitude_change_ft: if self.altitude_change_ft > 0 {
                self.altitude_change_ft
            } else {
                DEFAULT_ALTITUDE_CHANGE_FT
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LastSent {
    at: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude_ft: i32,
}

/// Throttle state for one flight.
#[derive(Debug, Clone, Default)]
pub struct PositionThrottle {
    config: ThrottleConfig,
    last_sent: Option<LastSent>,
}

impl PositionThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config: config.normalized(),
            last_sent: None,
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        self.last_sent.map(|last| last.at)
    }

    /// Whether `position` should be sent now.
    pub fn should_send(&self, position: &Position) -> bool {
        self.should_send_at(position, Utc::now())
    }

    /// Whether `position` should be sent at `now`. Does not mutate state.
    pub fn should_send_at(&self, position: &Position, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_sent else {
            return true;
        };

        let interval = Duration::seconds(i64::from(self.config.interval_secs));
        let elapsed = now - last.at;

        if elapsed < interval {
            return false;
        }

        let alt_diff = (i64::from(position.altitude_ft) - i64::from(last.altitude_ft)).abs();
        if alt_diff >= i64::from(self.config.altitude_change_ft) {
            tracing::debug!("Throttle: altitude changed {} ft", alt_diff);
            return true;
        }

        let moved_nm = planar_distance_nm(
            last.latitude,
            last.longitude,
            position.latitude,
            position.longitude,
        );
        if moved_nm >= self.config.distance_nm {
            tracing::debug!("Throttle: moved {:.2} nm", moved_nm);
            return true;
        }

        let heartbeat = Duration::seconds(i64::from(self.config.interval_secs) * FORCE_SEND_INTERVALS);
        if elapsed >= heartbeat {
            tracing::debug!("Throttle: heartbeat after {}s", elapsed.num_seconds());
            return true;
        }

        false
    }

    /// Record that `position` was transmitted now.
    pub fn mark_sent(&mut self, position: &Position) {
        self.mark_sent_at(position, Utc::now());
    }

    pub fn mark_sent_at(&mut self, position: &Position, now: DateTime<Utc>) {
        self.last_sent = Some(LastSent {
            at: now,
            latitude: position.latitude,
            longitude: position.longitude,
            altitude_ft: position.altitude_ft,
        });
    }

    /// Forget the last transmission so the next position is always sent.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}
