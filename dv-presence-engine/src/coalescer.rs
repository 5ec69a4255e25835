//! Publish coalescing
//!
//! The coalescer owns the presence record and a single "publish owed" flag.
//! Detector passes only ever raise the flag; the record is built and handed to
//! the sink on a later tick. A change and its publication therefore never
//! share a tick.

use crate::config::{LARGE_ICON_KEY, UPDATE_INTERVAL_SECS};
use crate::sink::PresenceSink;
use crate::trackers::{CurrentConsistView, CurrentJobView};
use crate::types::{EpochSeconds, PresenceRecord};

/// Pending/idle state machine plus the detector timer
#[derive(Debug, Clone)]
pub struct PresenceCoalescer {
    pending: bool,
    /// Seconds accumulated since the last detector pass
    timer: f64,
    record: PresenceRecord,
}

impl PresenceCoalescer {
    /// Start pending, with the timer primed so the first idle tick runs the
    /// detectors
    pub fn new() -> Self {
        Self {
            pending: true,
            timer: UPDATE_INTERVAL_SECS,
            record: PresenceRecord::cleared(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// A publish is owed on the next tick
    pub fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// The record most recently handed to the sink
    pub fn record(&self) -> &PresenceRecord {
        &self.record
    }

    /// Accumulate frame time
    pub fn tick(&mut self, elapsed: f64) {
        self.timer += elapsed;
    }

    /// True when a detector pass is due
    ///
    /// The timer wraps instead of resetting, so sub-interval phase is kept.
    pub fn detector_due(&mut self) -> bool {
        if self.timer > UPDATE_INTERVAL_SECS {
            self.timer %= UPDATE_INTERVAL_SECS;
            true
        } else {
            false
        }
    }

    /// Publish if a publish is owed; returns whether it did
    pub fn maybe_publish<S: PresenceSink + ?Sized>(
        &mut self,
        sink: &mut S,
        job: &CurrentJobView,
        consist: &CurrentConsistView,
        now: EpochSeconds,
    ) -> bool {
        if !self.pending {
            return false;
        }
        self.record = compose(job, consist, now);
        log::debug!("Publishing presence: {}", self.record);
        sink.publish(&self.record);
        self.pending = false;
        true
    }
}

impl Default for PresenceCoalescer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a record from the tracker views
///
/// An end timestamp that is already in the past is dropped so an expired
/// countdown is never shown.
pub fn compose(
    job: &CurrentJobView,
    consist: &CurrentConsistView,
    now: EpochSeconds,
) -> PresenceRecord {
    PresenceRecord {
        state: consist.state.clone(),
        details: job.details.clone(),
        start_timestamp: job.start,
        end_timestamp: if job.end > now { job.end } else { 0 },
        small_image_key: consist.small_icon.key.to_string(),
        small_image_text: consist.small_icon.text.to_string(),
        large_image_key: LARGE_ICON_KEY.to_string(),
    }
}
