//! Recorded scenarios
//!
//! A scenario is a JSON timeline: world snapshots stamped with the replay time
//! they take effect at, plus scheduled events. Between two snapshots the world
//! is assumed unchanged.

use crate::events::ScheduledEvent;
use anyhow::{Context, Result};
use dv_presence_engine::{EpochSeconds, WorldSnapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Problems with a scenario's timeline
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Scenario has no frames")]
    Empty,

    #[error("Frame {index} at {at_secs}s is earlier than the frame before it")]
    FramesOutOfOrder { index: usize, at_secs: f64 },

    #[error("Event {index} at {at_secs}s is earlier than the event before it")]
    EventsOutOfOrder { index: usize, at_secs: f64 },

    #[error("Negative or non-finite time {0}s")]
    InvalidTime(f64),

    #[error("Frame {index}: {source}")]
    InvalidFrame {
        index: usize,
        #[source]
        source: dv_presence_engine::EngineError,
    },
}

/// One world snapshot and when it takes effect
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScenarioFrame {
    /// Seconds since the start of the replay
    pub at_secs: f64,
    pub world: WorldSnapshot,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scenario {
    /// Wall-clock time the replay starts at
    pub start_epoch: EpochSeconds,
    /// How long to play; defaults to one second past the last frame or event
    #[serde(default)]
    pub duration_secs: Option<f64>,
    pub frames: Vec<ScenarioFrame>,
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
}

impl Scenario {
    /// Check that frames and events are in time order and every snapshot is
    /// consistent
    pub fn validate(&self) -> std::result::Result<(), ScenarioError> {
        if self.frames.is_empty() {
            return Err(ScenarioError::Empty);
        }

        let frame_times = self.frames.iter().map(|f| f.at_secs);
        let event_times = self.events.iter().map(|e| e.at_secs);
        if let Some(bad) = frame_times
            .chain(event_times)
            .chain(self.duration_secs)
            .find(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(ScenarioError::InvalidTime(bad));
        }

        for (index, pair) in self.frames.windows(2).enumerate() {
            if pair[1].at_secs < pair[0].at_secs {
                return Err(ScenarioError::FramesOutOfOrder {
                    index: index + 1,
                    at_secs: pair[1].at_secs,
                });
            }
        }
        for (index, pair) in self.events.windows(2).enumerate() {
            if pair[1].at_secs < pair[0].at_secs {
                return Err(ScenarioError::EventsOutOfOrder {
                    index: index + 1,
                    at_secs: pair[1].at_secs,
                });
            }
        }

        for (index, frame) in self.frames.iter().enumerate() {
            frame
                .world
                .validate()
                .map_err(|source| ScenarioError::InvalidFrame { index, source })?;
        }

        Ok(())
    }

    /// The snapshot in effect at replay time `t`
    ///
    /// Before the first frame the first frame is used. Panics on a scenario
    /// without frames, which `validate` rejects.
    pub fn world_at(&self, t: f64) -> &WorldSnapshot {
        let index = self.frames.partition_point(|f| f.at_secs <= t);
        &self.frames[index.saturating_sub(1)].world
    }

    /// Total replay length in seconds
    pub fn duration(&self) -> f64 {
        self.duration_secs.unwrap_or_else(|| {
            let last_frame = self.frames.last().map(|f| f.at_secs).unwrap_or(0.0);
            let last_event = self.events.last().map(|e| e.at_secs).unwrap_or(0.0);
            last_frame.max(last_event) + 1.0
        })
    }
}

/// Load and validate a scenario from a JSON file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {:?}", path))?;

    let scenario: Scenario = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {:?}", path))?;

    scenario
        .validate()
        .with_context(|| format!("Invalid scenario file: {:?}", path))?;

    log::info!(
        "Loaded scenario {:?}: {} frames, {} events, {:.1}s",
        path,
        scenario.frames.len(),
        scenario.events.len(),
        scenario.duration()
    );
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventAction;
    use std::io::Write;

    fn frame(at_secs: f64, world: WorldSnapshot) -> ScenarioFrame {
        ScenarioFrame { at_secs, world }
    }

    fn scenario(frames: Vec<ScenarioFrame>) -> Scenario {
        Scenario {
            start_epoch: 1_700_000_000,
            duration_secs: None,
            frames,
            events: Vec::new(),
        }
    }

    #[test]
    fn test_world_at_picks_latest_frame() {
        let s = scenario(vec![
            frame(0.0, WorldSnapshot::new()),
            frame(10.0, WorldSnapshot::new().with_station("HB", "Harbor")),
        ]);
        assert!(s.world_at(0.0).stations.is_empty());
        assert!(s.world_at(9.99).stations.is_empty());
        assert_eq!(s.world_at(10.0).stations.len(), 1);
        assert_eq!(s.world_at(500.0).stations.len(), 1);
    }

    #[test]
    fn test_world_before_first_frame() {
        let s = scenario(vec![frame(5.0, WorldSnapshot::new().with_station("HB", "Harbor"))]);
        assert_eq!(s.world_at(0.0).stations.len(), 1);
    }

    #[test]
    fn test_duration_defaults_past_last_entry() {
        let mut s = scenario(vec![
            frame(0.0, WorldSnapshot::new()),
            frame(12.0, WorldSnapshot::new()),
        ]);
        assert_eq!(s.duration(), 13.0);

        s.events.push(ScheduledEvent {
            at_secs: 20.0,
            action: EventAction::Disable,
        });
        assert_eq!(s.duration(), 21.0);

        s.duration_secs = Some(5.0);
        assert_eq!(s.duration(), 5.0);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(scenario(vec![]).validate(), Err(ScenarioError::Empty)));

        let s = scenario(vec![frame(3.0, WorldSnapshot::new()), frame(1.0, WorldSnapshot::new())]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::FramesOutOfOrder { index: 1, .. })
        ));

        let s = scenario(vec![frame(-1.0, WorldSnapshot::new())]);
        assert!(matches!(s.validate(), Err(ScenarioError::InvalidTime(_))));

        let s = scenario(vec![frame(0.0, WorldSnapshot::new().with_player("L1", "T1"))]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::InvalidFrame { index: 0, .. })
        ));
    }

    #[test]
    fn test_load_scenario_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "start_epoch": 1700000000,
                "frames": [
                    {{ "at_secs": 0.0, "world": {{}} }},
                    {{ "at_secs": 4.0, "world": {{ "stations": {{ "HB": "Harbor" }} }} }}
                ],
                "events": [ {{ "at_secs": 2.0, "action": "disable" }} ]
            }}"#
        )
        .unwrap();

        let s = load_scenario(file.path()).unwrap();
        assert_eq!(s.frames.len(), 2);
        assert_eq!(s.events.len(), 1);
        assert_eq!(s.duration(), 5.0);
    }

    #[test]
    fn test_load_scenario_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_scenario(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse scenario file"));
    }
}
