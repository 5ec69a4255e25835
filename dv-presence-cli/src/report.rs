//! Replay report
//!
//! Summary printed after a replay: how much was simulated, how often the
//! detectors ran, and what the presence card ended up showing.

use crate::sink::render_txt;
use dv_presence_engine::{EngineStats, PresenceRecord};
use std::fmt;

#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub simulated_secs: f64,
    pub frames: u64,
    pub engine: EngineStats,
    pub sink_write_failures: usize,
    pub final_record: Option<PresenceRecord>,
}

impl ReplayReport {
    /// Average seconds between publishes, if anything was published
    pub fn publish_interval(&self) -> Option<f64> {
        (self.engine.publishes > 0).then(|| self.simulated_secs / self.engine.publishes as f64)
    }
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "═══════════════════════════════════════════════")?;
        writeln!(f, "  Replay Summary")?;
        writeln!(f, "═══════════════════════════════════════════════")?;
        writeln!(f, "  Simulated:        {:.2}s ({} frames)", self.simulated_secs, self.frames)?;
        writeln!(f, "  Engine ticks:     {}", self.engine.ticks)?;
        writeln!(f, "  Detector passes:  {}", self.engine.detector_passes)?;
        writeln!(f, "  Publishes:        {}", self.engine.publishes)?;
        writeln!(f, "  Clears:           {}", self.engine.clears)?;
        if let Some(interval) = self.publish_interval() {
            writeln!(f, "  Avg. interval:    {:.2}s", interval)?;
        }
        if self.sink_write_failures > 0 {
            writeln!(f, "  Write failures:   {}", self.sink_write_failures)?;
        }
        match &self.final_record {
            Some(record) => writeln!(f, "  Final card:       {}", render_txt(record)),
            None => writeln!(f, "  Final card:       (nothing published)"),
        }
    }
}
