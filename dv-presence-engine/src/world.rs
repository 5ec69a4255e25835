//! Host query surface
//!
//! The engine never owns simulation state. Each tick it reads the host through
//! [`HostWorld`] and reads wall-clock time through [`Clock`]; both are taken by
//! reference so the host decides how snapshots are produced.

use crate::types::{Car, ConsistId, EpochSeconds, ObservedJob, VehicleRef};
use std::cell::Cell;

/// Read-only view of the host simulation
///
/// Every lookup returns `None` instead of failing; the trackers have a
/// fallback for each absent value.
pub trait HostWorld {
    /// Jobs the player currently holds, in host iteration order
    fn active_jobs(&self) -> &[ObservedJob];

    /// Display name of a station, looked up by yard id
    fn station_display_name(&self, station_id: &str) -> Option<&str>;

    /// The car the player is currently in, if any
    fn player_vehicle(&self) -> Option<&VehicleRef>;

    /// The last locomotive the player entered, if any
    fn last_entered_locomotive(&self) -> Option<&VehicleRef>;

    /// Cars of a consist, front to back
    fn consist(&self, id: &ConsistId) -> Option<&[Car]>;
}

/// Source of wall-clock time in epoch seconds
pub trait Clock {
    fn now(&self) -> EpochSeconds;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> EpochSeconds {
        (**self).now()
    }
}

/// The real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochSeconds {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that only moves when told to
///
/// Used for replays and tests. Interior mutability lets the driver move time
/// while the engine holds a shared reference.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<EpochSeconds>,
}

impl ManualClock {
    pub fn new(start: EpochSeconds) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: EpochSeconds) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: i64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochSeconds {
        self.now.get()
    }
}
