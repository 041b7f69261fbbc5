//! Servo rig controller: host entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  StdioLink   PinButton   SimulatedCurrentSensor   SystemClock  │
//! │  (LinkPort)  (Button)    (CurrentSensorPort)      (ClockPort)  │
//! │  SimulatedServoBank (ActuatorPort)   LogEventSink (EventSink)  │
//! │  FileFaultRecord (FaultRecordPort)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Scheduler (pure logic)                    │    │
//! │  │  AxisRegistry · ModeMachine · CommandLink · Safety     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing on the host toggles the button pin or deflects the jog input,
//! so JOG holds still and modes change only by `SET_MODE` on stdin.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use servorig::adapters::button_pin::{PinButton, SimulatedPin};
use servorig::adapters::current::SimulatedCurrentSensor;
use servorig::adapters::fault_file::FileFaultRecord;
use servorig::adapters::hardware::HostRig;
use servorig::adapters::link::StdioLink;
use servorig::adapters::log_sink::LogEventSink;
use servorig::adapters::servo::SimulatedServoBank;
use servorig::adapters::time::SystemClock;
use servorig::axis::AxisRegistry;
use servorig::config::{self, SystemConfig};
use servorig::diagnostics;
use servorig::logging;
use servorig::modes::{HomeMode, JogMode, ModeId, ModeMachine, PlaybackMode};
use servorig::scheduler::Scheduler;
use servorig::sequence::Sequence;

/// Multi-axis servo rig controller
#[derive(Parser, Debug)]
#[command(name = "servorig")]
#[command(version)]
#[command(about = "Multi-axis servo rig controller: homing, jog, sequence playback, overcurrent cutoff")]
#[command(long_about = None)]
struct Args {
    /// Axis definitions (JSON array of {name, pin, min_value, max_value, home_value}).
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Optional rig settings (JSON, any subset of the tunables).
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Recorded sequence, one CSV frame per line.
    #[arg(long, default_value = "sequence.csv")]
    sequence: PathBuf,

    /// Where the fatal-fault record is written.
    #[arg(long, default_value = "error.log")]
    fault_log: PathBuf,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Baseline reading of the simulated current sensor (amps).
    #[arg(long, default_value_t = 0.3)]
    sim_current: f32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ── 1. Logging ────────────────────────────────────────────
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::init(level, args.log_file.as_deref()).context("logger setup")?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Servo rig v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    diagnostics::install_panic_handler();

    // ── 2. Configuration and sequence ─────────────────────────
    let settings = match &args.settings {
        Some(path) => SystemConfig::load(path).context("rig settings")?,
        None => SystemConfig::default(),
    };
    let axis_configs = config::load_axes(&args.config).context("axis configuration")?;
    let sequence = Sequence::load(&args.sequence, axis_configs.len());

    // ── 3. Adapters ───────────────────────────────────────────
    let axes = AxisRegistry::new(&axis_configs, SimulatedServoBank::new());
    let mut rig = HostRig::new(
        StdioLink::spawn().context("command link")?,
        // Never pressed on the host.
        PinButton::active_low(SimulatedPin::pulled_up()),
        SimulatedCurrentSensor::new(args.sim_current),
        SystemClock::new(),
    );
    let mut sink = LogEventSink::new();
    let mut fault_record = FileFaultRecord::new(&args.fault_log);

    // ── 4. Core ───────────────────────────────────────────────
    let modes = ModeMachine::new(
        HomeMode::new(),
        JogMode::new(&settings),
        PlaybackMode::new(sequence, settings.frame_rate),
        ModeId::Home,
    );
    let mut scheduler = Scheduler::new(&settings, axes, modes);

    // Installed before anything is energised, so a failure here leaves
    // nothing to shut down.
    let running = scheduler.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })
    .context("interrupt handler")?;

    // ── 5. Control loop ───────────────────────────────────────
    scheduler
        .supervise(&mut rig, &mut sink, &mut fault_record)
        .with_context(|| format!("control loop (fault log: {})", args.fault_log.display()))?;

    info!("Stopped after {} iterations", scheduler.iteration());
    Ok(())
}
