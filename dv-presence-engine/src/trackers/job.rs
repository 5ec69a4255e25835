//! Active job tracking
//!
//! Follows the highest-paying job the player holds and derives the detail line
//! and countdown window from it.

use crate::config::{DETAILS_IDLE, MAX_TIMER_DIFFERENCE_SECS};
use crate::types::{EpochSeconds, JobId, JobKind, ObservedJob};
use crate::world::HostWorld;

/// Which end of the job chain a job is described by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StationRole {
    Origin,
    Destination,
}

/// Job type label, preposition and the station the description refers to
fn job_phrase(kind: JobKind) -> (&'static str, &'static str, StationRole) {
    match kind {
        JobKind::ShuntingLoad => ("Loading Cars", "in", StationRole::Origin),
        JobKind::ShuntingUnload => ("Unloading Cars", "in", StationRole::Destination),
        JobKind::Transport => ("Freight Haul", "to", StationRole::Destination),
        JobKind::EmptyHaul => ("Logistical Haul", "to", StationRole::Destination),
        JobKind::Other => ("Unknown Job", "from", StationRole::Origin),
    }
}

/// Detail line for a job, e.g. "Freight Haul to Harbor"
///
/// When the station cannot be resolved the clause is dropped and only the job
/// type remains.
pub fn describe_job<W: HostWorld + ?Sized>(job: &ObservedJob, world: &W) -> String {
    let (job_type, preposition, role) = job_phrase(job.kind);
    let station_id = match role {
        StationRole::Origin => &job.origin_id,
        StationRole::Destination => &job.destination_id,
    };
    match world.station_display_name(station_id) {
        Some(station) => format!("{} {} {}", job_type, preposition, station),
        None => job_type.to_string(),
    }
}

/// Highest-paying job; ties keep the first one found
pub fn highest_paying(jobs: &[ObservedJob]) -> Option<&ObservedJob> {
    jobs.iter().fold(None, |best, job| match best {
        Some(b) if b.base_payment >= job.base_payment => Some(b),
        _ => Some(job),
    })
}

/// What the job tracker currently reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentJobView {
    /// Kind of the current job, `None` when idle
    pub kind: Option<JobKind>,
    pub details: String,
    pub start: EpochSeconds,
    /// 0 when there is no countdown
    pub end: EpochSeconds,
}

impl CurrentJobView {
    fn idle(now: EpochSeconds) -> Self {
        Self {
            kind: None,
            details: DETAILS_IDLE.to_string(),
            start: now,
            end: 0,
        }
    }
}

/// Tracks the player's highest-paying job
#[derive(Debug, Clone)]
pub struct JobTracker {
    /// Job being followed
    current: Option<JobId>,
    /// Number of active jobs at the last re-rank, -1 forces a re-rank
    recorded_count: i64,
    /// Whether the bonus window had run out at the last pass
    bonus_over: bool,
    view: CurrentJobView,
}

impl JobTracker {
    /// Create an idle tracker whose timer window starts at `now`
    pub fn new(now: EpochSeconds) -> Self {
        Self {
            current: None,
            recorded_count: 0,
            bonus_over: false,
            view: CurrentJobView::idle(now),
        }
    }

    pub fn view(&self) -> &CurrentJobView {
        &self.view
    }

    pub fn current_job(&self) -> Option<&JobId> {
        self.current.as_ref()
    }

    /// True while a job is being followed
    pub fn has_job(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the job ranking must be recomputed this pass
    ///
    /// Re-ranking happens when the number of active jobs differs from the last
    /// recorded count, or when the followed job is no longer active (one job
    /// finished and another was taken between two passes).
    pub fn needs_rerank(&self, jobs: &[ObservedJob]) -> bool {
        if jobs.len() as i64 != self.recorded_count {
            return true;
        }
        match &self.current {
            Some(id) => !jobs.iter().any(|j| &j.id == id),
            None => false,
        }
    }

    /// Run one detector pass; returns true when the detail line or countdown
    /// changed enough to be worth publishing
    pub fn update<W: HostWorld + ?Sized>(&mut self, world: &W, now: EpochSeconds) -> bool {
        let jobs = world.active_jobs();
        let mut changed = false;

        if self.needs_rerank(jobs) {
            let highest = highest_paying(jobs).map(|j| j.id.clone());
            changed = self.current != highest;
            if changed {
                log::debug!("Current job: {:?} -> {:?}", self.current, highest);
            }
            self.current = highest;

            if self.current.is_none() && self.recorded_count > 0 {
                // Jobs were counted but none ranked; look again next pass
                log::warn!(
                    "No job ranked out of {} active jobs, forcing a rescan",
                    jobs.len()
                );
                self.recorded_count = -1;
            } else {
                self.recorded_count = jobs.len() as i64;
            }
        }

        let job = self
            .current
            .as_ref()
            .and_then(|id| jobs.iter().find(|j| &j.id == id));

        if let Some(job) = job {
            // Hosts that skip validation can hand over absurd timers
            let actual_start = now.saturating_sub(job.time_on_job as i64);
            let end = actual_start.saturating_add(job.time_limit as i64);
            let times_up = end < now;
            let drift = actual_start.saturating_sub(self.view.start).saturating_abs();

            if self.bonus_over != times_up {
                log::debug!("Bonus time over for job {}: {}", job.id, times_up);
            }
            if drift > MAX_TIMER_DIFFERENCE_SECS {
                log::trace!("Job timer resynced by {}s", drift);
            }

            changed = changed || self.bonus_over != times_up || drift > MAX_TIMER_DIFFERENCE_SECS;
            self.view.start = actual_start;
            self.view.end = end;
            self.bonus_over = times_up;
        }

        if changed {
            match job {
                None => {
                    self.view = CurrentJobView::idle(now);
                    self.bonus_over = false;
                }
                Some(job) => {
                    self.view.kind = Some(job.kind);
                    self.view.details = describe_job(job, world);
                }
            }
        }

        changed
    }
}
