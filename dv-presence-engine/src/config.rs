//! Engine constants
//!
//! The engine has no runtime configuration: cadence, tolerances and every
//! label or icon key that ends up in a presence record are fixed here.

/// Application id registered with the presence service
pub const CLIENT_ID: &str = "716722953340846172";

/// Seconds between two detector passes
pub const UPDATE_INTERVAL_SECS: f64 = 1.0;

/// Jitter allowed between the recorded and recomputed job start before the
/// countdown is considered resynced
pub const MAX_TIMER_DIFFERENCE_SECS: i64 = 10;

/// Largest job timer (time on job or time limit) a snapshot may carry
pub const MAX_JOB_TIMER_SECS: f64 = 366.0 * 24.0 * 3600.0;

/// Detail line when the player has no job
pub const DETAILS_IDLE: &str = "No Active Jobs";

/// State line when the player is not tracking any consist
pub const STATE_IDLE: &str = "Idle";

/// State line for a consist made only of locomotives
pub const STATE_NO_CARGO: &str = "No Cargo";

/// State line for a consist made only of locomotives, one of them derailed
pub const STATE_DERAILED: &str = "Derailed";

/// Large icon shown on every record
pub const LARGE_ICON_KEY: &str = "icon";

