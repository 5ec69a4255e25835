//! Scheduled scenario events
//!
//! Besides world snapshots a recording can contain host actions (the mod being
//! toggled) and sink connectivity notifications, each stamped with the replay
//! time it happened at.

use dv_presence_engine::{Clock, PresenceEngine, PresenceSink, SinkEvent};
use serde::{Deserialize, Serialize};

/// Something that happens to the engine at a given replay time
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScheduledEvent {
    /// Seconds since the start of the replay
    pub at_secs: f64,
    #[serde(flatten)]
    pub action: EventAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EventAction {
    /// The mod was switched on
    Enable,
    /// The mod was switched off
    Disable,
    /// The presence connection reported something
    Sink { event: SinkEvent },
}

impl ScheduledEvent {
    /// Apply this event to the engine
    pub fn apply<C: Clock, S: PresenceSink + ?Sized>(
        &self,
        engine: &mut PresenceEngine<C>,
        sink: &mut S,
    ) {
        log::debug!("t={:.2}s: {:?}", self.at_secs, self.action);
        match &self.action {
            EventAction::Enable => engine.set_enabled(true, sink),
            EventAction::Disable => engine.set_enabled(false, sink),
            EventAction::Sink { event } => engine.on_sink_event(event),
        }
    }
}
