//! Presence sink interface
//!
//! The sink is whatever delivers records to the presence service. It owns its
//! own connection, retries and outbound rate limiting; the engine only hands
//! it finished records.

use crate::types::PresenceRecord;
use serde::{Deserialize, Serialize};

/// Destination for presence records
pub trait PresenceSink {
    /// Fire-and-forget publish
    fn publish(&mut self, record: &PresenceRecord);

    /// Blank the presence card
    fn clear(&mut self) {
        self.publish(&PresenceRecord::cleared());
    }

    /// Release the connection; called once when the engine is unloaded
    fn shutdown(&mut self) {}
}

impl<S: PresenceSink + ?Sized> PresenceSink for &mut S {
    fn publish(&mut self, record: &PresenceRecord) {
        (**self).publish(record)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

/// Connectivity notifications a sink may report back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SinkEvent {
    Ready,
    Disconnected { code: i32, message: String },
    Error { code: i32, message: String },
}

/// A sink that keeps everything it is given
///
/// Useful for tests and for hosts that forward records themselves.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Every record received, clears included
    pub records: Vec<PresenceRecord>,
    /// Number of `clear` calls
    pub clears: usize,
    pub shut_down: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&PresenceRecord> {
        self.records.last()
    }

    /// Number of non-clear publishes
    pub fn publishes(&self) -> usize {
        self.records.len() - self.clears
    }
}

impl PresenceSink for RecordingSink {
    fn publish(&mut self, record: &PresenceRecord) {
        self.records.push(record.clone());
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.records.push(PresenceRecord::cleared());
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }
}
