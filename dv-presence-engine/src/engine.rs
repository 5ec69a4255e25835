//! Main engine API
//!
//! [`PresenceEngine`] is the entry point. It owns both trackers and the
//! coalescer and is driven by the host once per frame through [`PresenceEngine::tick`].

use crate::coalescer::PresenceCoalescer;
use crate::sink::{PresenceSink, SinkEvent};
use crate::trackers::{ConsistTracker, CurrentConsistView, CurrentJobView, JobTracker};
use crate::types::PresenceRecord;
use crate::world::{Clock, HostWorld, SystemClock};

/// Lifecycle of the engine as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Ticking normally
    Enabled,
    /// Switched off by the host; ticks are ignored until re-enabled
    Dormant,
    /// Unloaded; the sink has been shut down
    Shutdown,
}

/// Counters for what the engine has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Ticks processed while enabled
    pub ticks: u64,
    /// Detector passes run
    pub detector_passes: u64,
    /// Records published
    pub publishes: u64,
    /// Clears sent on disable or shutdown
    pub clears: u64,
}

/// The presence engine - entry point for hosts
///
/// # Example
/// ```
/// use dv_presence_engine::{ManualClock, PresenceEngine, RecordingSink, WorldSnapshot};
///
/// let clock = ManualClock::new(1_700_000_000);
/// let mut engine = PresenceEngine::with_clock(&clock);
/// let mut sink = RecordingSink::new();
/// let world = WorldSnapshot::new();
///
/// // The first tick publishes the idle record
/// engine.tick(1.0 / 60.0, &world, &mut sink);
/// assert_eq!(sink.last().unwrap().state, "Idle");
/// ```
pub struct PresenceEngine<C: Clock = SystemClock> {
    clock: C,
    jobs: JobTracker,
    consist: ConsistTracker,
    coalescer: PresenceCoalescer,
    state: EngineState,
    stats: EngineStats,
}

impl PresenceEngine<SystemClock> {
    /// Create an engine reading wall-clock time
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PresenceEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PresenceEngine<C> {
    /// Create an engine reading time from `clock`
    ///
    /// The engine starts enabled with a publish pending, so the idle record
    /// goes out on the first tick.
    pub fn with_clock(clock: C) -> Self {
        let now = clock.now();
        log::info!("Presence engine started (client id {})", crate::config::CLIENT_ID);
        Self {
            clock,
            jobs: JobTracker::new(now),
            consist: ConsistTracker::new(),
            coalescer: PresenceCoalescer::new(),
            state: EngineState::Enabled,
            stats: EngineStats::default(),
        }
    }

    /// Advance the engine by one frame
    ///
    /// Either publishes an owed record or, when the detector interval has
    /// elapsed, runs the job tracker and then the consist tracker. Never both
    /// in the same tick. Does nothing unless enabled.
    pub fn tick<W, S>(&mut self, elapsed: f64, world: &W, sink: &mut S)
    where
        W: HostWorld + ?Sized,
        S: PresenceSink + ?Sized,
    {
        if self.state != EngineState::Enabled {
            return;
        }
        self.stats.ticks += 1;
        self.coalescer.tick(elapsed);
        let now = self.clock.now();

        if self
            .coalescer
            .maybe_publish(sink, self.jobs.view(), self.consist.view(), now)
        {
            self.stats.publishes += 1;
        } else if self.coalescer.detector_due() {
            self.stats.detector_passes += 1;
            // Job first: the consist tracker needs to know whether a job is active
            let job_changed = self.jobs.update(world, now);
            let consist_changed = self.consist.update(world, self.jobs.has_job());
            if job_changed || consist_changed {
                log::trace!(
                    "Change detected (job: {}, consist: {})",
                    job_changed,
                    consist_changed
                );
                self.coalescer.mark_pending();
            }
        }
    }

    /// Switch presence on or off
    ///
    /// Disabling blanks the presence card once and makes the engine dormant.
    /// Enabling forces a publish on the next tick.
    pub fn set_enabled<S: PresenceSink + ?Sized>(&mut self, enabled: bool, sink: &mut S) {
        match (self.state, enabled) {
            (EngineState::Shutdown, _) => {
                log::warn!("Ignoring enable/disable after shutdown");
            }
            (EngineState::Enabled, false) => {
                log::info!("Presence disabled, clearing");
                sink.clear();
                self.stats.clears += 1;
                self.state = EngineState::Dormant;
            }
            (EngineState::Dormant, false) => {}
            (_, true) => {
                if self.state == EngineState::Dormant {
                    log::info!("Presence enabled");
                }
                self.state = EngineState::Enabled;
                self.coalescer.mark_pending();
            }
        }
    }

    /// Clear presence and release the sink; the engine stays inert afterwards
    pub fn shutdown<S: PresenceSink + ?Sized>(&mut self, sink: &mut S) {
        if self.state == EngineState::Shutdown {
            return;
        }
        if self.state == EngineState::Enabled {
            sink.clear();
            self.stats.clears += 1;
        }
        sink.shutdown();
        self.state = EngineState::Shutdown;
        log::info!(
            "Presence engine shut down after {} publishes",
            self.stats.publishes
        );
    }

    /// Log a connectivity notification from the sink
    ///
    /// Nothing else happens: the engine keeps computing and the next owed
    /// publish goes out once the sink is back.
    pub fn on_sink_event(&self, event: &SinkEvent) {
        match event {
            SinkEvent::Ready => log::info!("Got ready callback."),
            SinkEvent::Disconnected { code, message } => {
                log::warn!("Got disconnect {}: {}", code, message)
            }
            SinkEvent::Error { code, message } => log::warn!("Got error {}: {}", code, message),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == EngineState::Enabled
    }

    pub fn is_pending(&self) -> bool {
        self.coalescer.is_pending()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn job_view(&self) -> &CurrentJobView {
        self.jobs.view()
    }

    pub fn consist_view(&self) -> &CurrentConsistView {
        self.consist.view()
    }

    /// The record most recently published
    pub fn last_record(&self) -> &PresenceRecord {
        self.coalescer.record()
    }
}
