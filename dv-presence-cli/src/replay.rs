//! Scenario playback
//!
//! Drives the engine exactly like the game would: one tick per frame with a
//! fixed frame time, the world taken from the scenario timeline, and wall-clock
//! time derived from the scenario start plus elapsed replay time.

use crate::report::ReplayReport;
use crate::scenario::Scenario;
use crate::sink::OutputSink;
use dv_presence_engine::{ManualClock, PresenceEngine};
use std::io::Write;

/// Play `scenario` through a fresh engine, publishing into `sink`
///
/// The engine is shut down at the end, which clears the card.
pub fn run_replay<W: Write>(
    scenario: &Scenario,
    frame_delta_secs: f64,
    sink: &mut OutputSink<W>,
) -> ReplayReport {
    let clock = ManualClock::new(scenario.start_epoch);
    let mut engine = PresenceEngine::with_clock(&clock);
    let duration = scenario.duration();
    let mut events = scenario.events.iter().peekable();
    let mut frames: u64 = 0;

    log::info!(
        "Replaying {:.1}s at {:.4}s per frame",
        duration,
        frame_delta_secs
    );

    loop {
        let t = frames as f64 * frame_delta_secs;
        if t > duration {
            break;
        }
        clock.set(scenario.start_epoch + t.floor() as i64);
        sink.set_replay_time(t);

        while let Some(event) = events.next_if(|e| e.at_secs <= t) {
            event.apply(&mut engine, sink);
        }

        engine.tick(frame_delta_secs, scenario.world_at(t), sink);
        frames += 1;
    }

    let final_record = (engine.stats().publishes > 0).then(|| engine.last_record().clone());
    sink.set_replay_time(frames as f64 * frame_delta_secs);
    engine.shutdown(sink);

    ReplayReport {
        simulated_secs: frames as f64 * frame_delta_secs,
        frames,
        engine: engine.stats(),
        sink_write_failures: sink.write_failures(),
        final_record,
    }
}
