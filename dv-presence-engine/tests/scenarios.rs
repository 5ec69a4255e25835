// End-to-end runs of the presence engine over hand-built worlds
use dv_presence_engine::{
    Car, CarId, CarType, CargoType, JobId, JobKind, LocoKind, ManualClock, ObservedJob,
    PresenceEngine, RecordingSink, SinkEvent, WorldSnapshot,
};

const T: i64 = 1_700_000_000;
const FRAME: f64 = 0.25;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn transport_job(time_on_job: f64, time_limit: f64) -> ObservedJob {
    ObservedJob {
        id: JobId::new("FH-01"),
        kind: JobKind::Transport,
        base_payment: 4_500.0,
        time_on_job,
        time_limit,
        origin_id: "STA".to_string(),
        destination_id: "STB".to_string(),
    }
}

fn diesel(id: &str) -> Car {
    Car {
        id: CarId::new(id),
        car_type: CarType::locomotive(LocoKind::Diesel),
        derailed: false,
        cargo: None,
        empty_mass: 120_000.0,
        cargo_mass: 0.0,
        length: 18.0,
    }
}

fn wagon(id: &str, cargo: Option<(&str, &str)>, mass: f64, length: f64) -> Car {
    Car {
        id: CarId::new(id),
        car_type: CarType::wagon("Flatbed Stakes"),
        derailed: false,
        cargo: cargo.map(|(id, name)| CargoType::new(id, name)),
        empty_mass: mass / 2.0,
        cargo_mass: mass / 2.0,
        length,
    }
}

fn in_train(cars: Vec<Car>) -> WorldSnapshot {
    WorldSnapshot::new()
        .with_consist("T1", cars)
        .with_player("L1", "T1")
        .with_last_loco("L1", "T1")
}

/// Tick until the engine has published `count` more records (or give up)
fn run_until_published(
    engine: &mut PresenceEngine<&ManualClock>,
    world: &WorldSnapshot,
    sink: &mut RecordingSink,
    count: usize,
) {
    let target = sink.records.len() + count;
    for _ in 0..40 {
        if sink.records.len() >= target {
            return;
        }
        engine.tick(FRAME, world, sink);
    }
    panic!("engine published {} of {} records", sink.records.len(), target);
}

/// Publish the startup record, then let the detectors settle on `world`
fn settle(
    engine: &mut PresenceEngine<&ManualClock>,
    world: &WorldSnapshot,
    sink: &mut RecordingSink,
) {
    for _ in 0..40 {
        engine.tick(FRAME, world, sink);
    }
}

#[test]
fn idle_when_nothing_is_going_on() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();

    settle(&mut engine, &WorldSnapshot::new(), &mut sink);

    assert_eq!(sink.records.len(), 1);
    let record = sink.last().unwrap();
    assert_eq!(record.state, "Idle");
    assert_eq!(record.details, "No Active Jobs");
    assert_eq!(record.start_timestamp, T);
    assert_eq!(record.end_timestamp, 0);
    assert_eq!(record.large_image_key, "icon");
}

#[test]
fn transport_job_shows_countdown() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let world = WorldSnapshot::new()
        .with_station("STA", "Steel Mill")
        .with_station("STB", "Harbor")
        .with_job(transport_job(30.0, 600.0));

    settle(&mut engine, &world, &mut sink);

    assert_eq!(sink.records.len(), 2);
    let record = sink.last().unwrap();
    assert_eq!(record.details, "Freight Haul to Harbor");
    assert_eq!(record.start_timestamp, T - 30);
    assert_eq!(record.end_timestamp, T + 570);
    // Player is on foot, nothing tracked yet
    assert_eq!(record.state, "Idle");
}

#[test]
fn consist_summary_line() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let world = in_train(vec![
        diesel("L1"),
        wagon("W1", Some(("logs", "Logs")), 40_000.0, 20.0),
        wagon("W2", Some(("logs", "Logs")), 40_000.0, 20.0),
        wagon("W3", Some(("logs", "Logs")), 40_000.0, 20.0),
    ]);

    settle(&mut engine, &world, &mut sink);

    let record = sink.last().unwrap();
    assert_eq!(record.state, "Logs: 120.00 tons; 60.00 meters");
    assert_eq!(record.small_image_key, "locodiesel");
    assert_eq!(record.small_image_text, "DE6 Diesel");
}

#[test]
fn consist_line_ignores_wagon_order() {
    init_logging();
    let wagons = vec![
        wagon("W1", Some(("logs", "Logs")), 30_000.0, 10.0),
        wagon("W2", Some(("logs", "Logs")), 40_000.0, 20.0),
        wagon("W3", Some(("logs", "Logs")), 50_000.0, 30.0),
    ];
    let mut reversed = wagons.clone();
    reversed.reverse();

    let mut lines = Vec::new();
    for order in [wagons, reversed] {
        let clock = ManualClock::new(T);
        let mut engine = PresenceEngine::with_clock(&clock);
        let mut sink = RecordingSink::new();
        let mut cars = vec![diesel("L1")];
        cars.extend(order);
        settle(&mut engine, &in_train(cars), &mut sink);
        lines.push(sink.last().unwrap().state.clone());
    }

    assert_eq!(lines[0], "Logs: 120.00 tons; 60.00 meters");
    assert_eq!(lines[0], lines[1]);
}

#[test]
fn mixed_cargo_gets_etc_suffix() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let world = in_train(vec![
        diesel("L1"),
        wagon("W1", Some(("logs", "Logs")), 40_000.0, 20.0),
        wagon("W2", Some(("planks", "Planks")), 40_000.0, 20.0),
    ]);

    settle(&mut engine, &world, &mut sink);

    assert_eq!(
        sink.last().unwrap().state,
        "Logs, etc.: 80.00 tons; 40.00 meters"
    );
}

#[test]
fn derailment_is_reported() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let mut world = in_train(vec![
        diesel("L1"),
        wagon("W1", Some(("logs", "Logs")), 40_000.0, 20.0),
    ]);
    settle(&mut engine, &world, &mut sink);

    world.consists.values_mut().next().unwrap()[1].derailed = true;
    run_until_published(&mut engine, &world, &mut sink, 1);
    assert_eq!(
        sink.last().unwrap().state,
        "Logs: 40.00 tons; 20.00 meters; derailed"
    );

    // Locomotive alone, derailed
    let mut world = in_train(vec![diesel("L1")]);
    world.consists.values_mut().next().unwrap()[0].derailed = true;
    run_until_published(&mut engine, &world, &mut sink, 1);
    assert_eq!(sink.last().unwrap().state, "Derailed");
}

#[test]
fn disable_clears_once_and_enable_republishes() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let world = WorldSnapshot::new();

    // Disabled while the startup publish is still owed
    assert!(engine.is_pending());
    engine.set_enabled(false, &mut sink);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.clears, 1);
    let cleared = sink.last().unwrap();
    assert!(cleared.state.is_empty());
    assert!(cleared.details.is_empty());
    assert_eq!(cleared.start_timestamp, 0);
    assert_eq!(cleared.end_timestamp, 0);

    for _ in 0..20 {
        engine.tick(FRAME, &world, &mut sink);
    }
    assert_eq!(sink.records.len(), 1);

    engine.set_enabled(true, &mut sink);
    engine.tick(FRAME, &world, &mut sink);
    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.last().unwrap().state, "Idle");
}

#[test]
fn expired_bonus_drops_countdown() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let mut world = WorldSnapshot::new()
        .with_station("STB", "Harbor")
        .with_job(transport_job(590.0, 600.0));

    settle(&mut engine, &world, &mut sink);
    assert_eq!(sink.last().unwrap().end_timestamp, T + 10);

    clock.advance(20);
    world.jobs[0].time_on_job = 610.0;
    run_until_published(&mut engine, &world, &mut sink, 1);

    let record = sink.last().unwrap();
    assert_eq!(record.details, "Freight Haul to Harbor");
    assert_eq!(record.start_timestamp, T - 590);
    assert_eq!(record.end_timestamp, 0);
}

#[test]
fn consist_is_kept_while_on_foot_during_job() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let mut world = in_train(vec![
        diesel("L1"),
        wagon("W1", Some(("logs", "Logs")), 40_000.0, 20.0),
    ])
    .with_station("STB", "Harbor")
    .with_job(transport_job(30.0, 600.0));

    settle(&mut engine, &world, &mut sink);
    let published = sink.records.len();
    let state = sink.last().unwrap().state.clone();

    // Step off the train: nothing to publish, the card keeps the consist
    world.player = None;
    settle(&mut engine, &world, &mut sink);
    assert_eq!(sink.records.len(), published);
    assert_eq!(engine.consist_view().state, state);

    // Job handed in: back to idle on both lines
    world.jobs.clear();
    run_until_published(&mut engine, &world, &mut sink, 1);
    let record = sink.last().unwrap();
    assert_eq!(record.details, "No Active Jobs");
    assert_eq!(record.state, "Idle");
    assert!(record.small_image_key.is_empty());
}

#[test]
fn unchanged_world_publishes_nothing_more() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let world = in_train(vec![diesel("L1")])
        .with_station("STB", "Harbor")
        .with_job(transport_job(30.0, 600.0));

    settle(&mut engine, &world, &mut sink);
    let published = sink.records.len();
    let passes = engine.stats().detector_passes;

    settle(&mut engine, &world, &mut sink);
    assert_eq!(sink.records.len(), published);
    assert!(engine.stats().detector_passes > passes);
}

#[test]
fn sink_trouble_does_not_stop_updates() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    let mut world = WorldSnapshot::new().with_station("STB", "Harbor");
    settle(&mut engine, &world, &mut sink);

    engine.on_sink_event(&SinkEvent::Disconnected {
        code: 1000,
        message: "pipe closed".to_string(),
    });
    world.jobs.push(transport_job(30.0, 600.0));
    run_until_published(&mut engine, &world, &mut sink, 1);
    engine.on_sink_event(&SinkEvent::Ready);

    assert_eq!(sink.last().unwrap().details, "Freight Haul to Harbor");
}

#[test]
fn shutdown_clears_and_releases_sink() {
    init_logging();
    let clock = ManualClock::new(T);
    let mut engine = PresenceEngine::with_clock(&clock);
    let mut sink = RecordingSink::new();
    settle(&mut engine, &WorldSnapshot::new(), &mut sink);

    engine.shutdown(&mut sink);
    assert!(sink.shut_down);
    assert_eq!(sink.clears, 1);
    assert_eq!(engine.stats().clears, 1);
}
