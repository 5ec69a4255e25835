//! DV Presence CLI Application
//!
//! Command-line driver for the presence engine. It plays a recorded
//! scenario through the engine frame by frame and adds:
//! - TOML configuration with CLI overrides
//! - Scheduled enable/disable and connection events
//! - Text or JSON output of every published record
//! - A replay summary report

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod events;
mod replay;
mod report;
mod scenario;
mod sink;

use config::{AppConfig, OutputFormat};
use sink::OutputSink;

/// DV Presence - Replay recorded sessions through the presence engine
#[derive(Parser, Debug)]
#[command(name = "dv-presence")]
#[command(about = "Replay recorded game sessions through the presence engine", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a recorded scenario (JSON)
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format for published records
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for published records (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Simulated frame time in seconds
    #[arg(long, value_name = "SECS")]
    frame_delta: Option<f64>,

    /// Skip the summary report
    #[arg(long)]
    no_report: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("DV Presence CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using presence engine v{}", dv_presence_engine::VERSION);

    let config = resolve_config(&args)?;

    let Some(scenario_path) = config.replay.scenario.clone() else {
        println!("DV Presence - No scenario specified");
        println!("\nQuick Start:");
        println!("  dv-presence --scenario shift.json");
        println!("  dv-presence --scenario shift.json --format json -o records.jsonl");
        println!("\nWith a configuration file:");
        println!("  dv-presence --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    };

    let scenario = scenario::load_scenario(&scenario_path)?;

    let writer: Box<dyn Write> = match &config.output.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };
    let mut sink = OutputSink::new(writer, config.output.format);

    let report = replay::run_replay(&scenario, config.replay.frame_delta_secs, &mut sink);
    sink.finish().context("Failed to flush output")?;

    if config.output.include_report && !args.quiet {
        println!();
        print!("{}", report);
    }

    Ok(())
}

/// Load the config file, if any, and apply CLI overrides on top
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(path) = &args.scenario {
        config.replay.scenario = Some(path.clone());
    }
    if let Some(delta) = args.frame_delta {
        config.replay.frame_delta_secs = delta;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(path) = &args.output {
        config.output.file = Some(path.clone());
    }
    if args.no_report {
        config.output.include_report = false;
    }

    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
