//! Simulated work shift
//!
//! Runs the presence engine over a short scripted shift (idle, take a job,
//! couple up wagons, derail) and prints every record the engine publishes.
//!
//! Usage:
//!   simulate_shift [--fps <frames>] [--verbose]
//!
//! Example:
//!   cargo run --example simulate_shift -- --fps 30

use dv_presence_engine::{
    Car, CarId, CarType, CargoType, JobId, JobKind, LocoKind, ManualClock, ObservedJob,
    PresenceEngine, PresenceRecord, PresenceSink, WorldSnapshot,
};
use std::env;

struct PrintingSink {
    clock_start: i64,
    now: i64,
    publishes: usize,
}

impl PresenceSink for PrintingSink {
    fn publish(&mut self, record: &PresenceRecord) {
        self.publishes += 1;
        println!("[t+{:>3}s] {}", self.now - self.clock_start, record);
    }

    fn clear(&mut self) {
        println!("[t+{:>3}s] (cleared)", self.now - self.clock_start);
    }
}

fn loco() -> Car {
    Car {
        id: CarId::new("L-001"),
        car_type: CarType::locomotive(LocoKind::Diesel),
        derailed: false,
        cargo: None,
        empty_mass: 120_000.0,
        cargo_mass: 0.0,
        length: 18.0,
    }
}

fn logs_wagon(id: &str) -> Car {
    Car {
        id: CarId::new(id),
        car_type: CarType::wagon("Flatbed Stakes"),
        derailed: false,
        cargo: Some(CargoType::new("Logs", "Logs")),
        empty_mass: 12_000.0,
        cargo_mass: 28_000.0,
        length: 14.0,
    }
}

/// The world at each second of the shift
fn world_at(second: u32) -> WorldSnapshot {
    let mut world = WorldSnapshot::new()
        .with_station("SM", "Sawmill")
        .with_station("HB", "Harbor");

    if second < 5 {
        return world;
    }

    world = world.with_job(ObservedJob {
        id: JobId::new("SM-FH-07"),
        kind: JobKind::Transport,
        base_payment: 9_800.0,
        time_on_job: f64::from(second - 5),
        time_limit: 1_200.0,
        origin_id: "SM".to_string(),
        destination_id: "HB".to_string(),
    });

    if second < 10 {
        return world;
    }

    let mut cars = vec![loco(), logs_wagon("W-1"), logs_wagon("W-2")];
    if second >= 20 {
        cars[2].derailed = true;
    }
    world
        .with_consist("T-1", cars)
        .with_player("L-001", "T-1")
        .with_last_loco("L-001", "T-1")
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut fps: u32 = 60;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--fps" if i + 1 < args.len() => {
                fps = args[i + 1].parse().unwrap_or(60).max(1);
                i += 1;
            }
            "--verbose" => verbose = true,
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    if verbose {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    let start = 1_700_000_000;
    let clock = ManualClock::new(start);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = PrintingSink {
        clock_start: start,
        now: start,
        publishes: 0,
    };

    println!("═══════════════════════════════════════════════");
    println!("  Simulated shift at {} fps", fps);
    println!("═══════════════════════════════════════════════\n");

    for second in 0..30 {
        let world = world_at(second);
        for _ in 0..fps {
            engine.tick(1.0 / f64::from(fps), &world, &mut sink);
        }
        clock.advance(1);
        sink.now = start + i64::from(second) + 1;
    }
    engine.shutdown(&mut sink);

    let stats = engine.stats();
    println!("\n📊 Engine:");
    println!("  Ticks:           {}", stats.ticks);
    println!("  Detector passes: {}", stats.detector_passes);
    println!("  Publishes:       {}", sink.publishes);
}
