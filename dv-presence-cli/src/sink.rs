//! Output sink
//!
//! Stands in for the presence connection during a replay: every record the
//! engine publishes is written out as a text line or a JSON object.

use crate::config::OutputFormat;
use chrono::DateTime;
use dv_presence_engine::{EpochSeconds, PresenceRecord, PresenceSink};
use std::io::{self, Write};

/// Presence sink writing records to any `Write`
pub struct OutputSink<W: Write> {
    writer: W,
    format: OutputFormat,
    /// Replay time stamped on the next line
    replay_secs: f64,
    publishes: usize,
    clears: usize,
    write_failures: usize,
}

impl<W: Write> OutputSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            replay_secs: 0.0,
            publishes: 0,
            clears: 0,
            write_failures: 0,
        }
    }

    /// Set the replay time written alongside the next records
    pub fn set_replay_time(&mut self, secs: f64) {
        self.replay_secs = secs;
    }

    pub fn publishes(&self) -> usize {
        self.publishes
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn write_failures(&self) -> usize {
        self.write_failures
    }

    /// Flush and hand back the writer
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_record(&mut self, kind: &str, record: &PresenceRecord) {
        let result = match self.format {
            OutputFormat::Txt => writeln!(
                self.writer,
                "[{:>8.2}s] {:<7} {}",
                self.replay_secs,
                kind,
                render_txt(record)
            ),
            OutputFormat::Json => {
                let line = serde_json::json!({
                    "t": self.replay_secs,
                    "kind": kind,
                    "record": record,
                });
                writeln!(self.writer, "{}", line)
            }
        };
        if let Err(e) = result {
            self.write_failures += 1;
            log::warn!("Failed to write presence record: {}", e);
        }
    }
}

impl<W: Write> PresenceSink for OutputSink<W> {
    fn publish(&mut self, record: &PresenceRecord) {
        self.publishes += 1;
        self.write_record("publish", record);
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.write_record("clear", &PresenceRecord::cleared());
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush output: {}", e);
        }
    }
}

/// Render an epoch timestamp as RFC 3339, or "-" when unset
pub fn format_epoch(secs: EpochSeconds) -> String {
    if secs == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}

/// One-line text rendering of a record
pub fn render_txt(record: &PresenceRecord) -> String {
    if record.details.is_empty() && record.state.is_empty() {
        return "(cleared)".to_string();
    }
    let mut line = format!("{} | {}", record.details, record.state);
    if !record.small_image_text.is_empty() {
        line.push_str(&format!(" [{}]", record.small_image_text));
    }
    line.push_str(&format!(" since {}", format_epoch(record.start_timestamp)));
    if record.has_countdown() {
        line.push_str(&format!(" until {}", format_epoch(record.end_timestamp)));
    }
    line
}
