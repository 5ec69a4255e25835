//! Derail Valley Presence Engine
//!
//! A reusable library that watches a running Derail Valley session and keeps a
//! rich-presence card ("Freight Haul to Harbor", "Logs: 120.00 tons; 60.00
//! meters") in sync with it.
//!
//! # Architecture
//!
//! The engine is single-threaded and tick-driven:
//! - The host calls [`PresenceEngine::tick`] once per frame with the frame time,
//!   a [`HostWorld`] view of the game and a [`PresenceSink`]
//! - Once per second the job and consist trackers look at the world and report
//!   whether anything meaningful changed
//! - A change makes a publish pending; the record goes to the sink on the next
//!   tick
//!
//! The library does NOT:
//! - Talk to the presence service (that is the sink's job, rate limiting included)
//! - Own or mutate any game state
//! - Persist anything
//!
//! # Example Usage
//!
//! ```
//! use dv_presence_engine::{ManualClock, PresenceEngine, RecordingSink, WorldSnapshot};
//!
//! let clock = ManualClock::new(1_700_000_000);
//! let mut engine = PresenceEngine::with_clock(&clock);
//! let mut sink = RecordingSink::new();
//!
//! let world = WorldSnapshot::new();
//! for _ in 0..120 {
//!     engine.tick(1.0 / 60.0, &world, &mut sink);
//! }
//!
//! let record = sink.last().unwrap();
//! assert_eq!(record.state, "Idle");
//! assert_eq!(record.details, "No Active Jobs");
//!
//! // Switching the mod off blanks the card
//! engine.set_enabled(false, &mut sink);
//! assert_eq!(sink.clears, 1);
//! ```

// Public modules
pub mod coalescer;
pub mod config;
pub mod engine;
pub mod format;
pub mod sink;
pub mod snapshot;
pub mod trackers;
pub mod types;
pub mod world;

// Re-export main types for convenience
pub use coalescer::PresenceCoalescer;
pub use engine::{EngineState, EngineStats, PresenceEngine};
pub use sink::{PresenceSink, RecordingSink, SinkEvent};
pub use snapshot::WorldSnapshot;
pub use trackers::{ConsistTracker, CurrentConsistView, CurrentJobView, JobTracker, SmallIcon};
pub use types::{
    Car, CarId, CarType, CargoType, ConsistId, EngineError, EpochSeconds, JobId, JobKind,
    LocoKind, ObservedJob, PresenceRecord, Result, VehicleRef,
};
pub use world::{Clock, HostWorld, ManualClock, SystemClock};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an engine with an empty world publishes the idle card
        let clock = ManualClock::new(0);
        let mut engine = PresenceEngine::with_clock(&clock);
        let mut sink = RecordingSink::new();
        engine.tick(0.0, &WorldSnapshot::new(), &mut sink);
        assert_eq!(sink.publishes(), 1);
    }
}
