//! Change detectors
//!
//! Each tracker owns the memory it needs to tell a meaningful change from
//! noise and exposes a read-only view of what it currently reports.

pub mod consist;
pub mod job;

// Re-export key types for convenience
pub use consist::{ConsistAggregate, ConsistTracker, CurrentConsistView, SmallIcon};
pub use job::{describe_job, highest_paying, CurrentJobView, JobTracker};
