//! Mock rig adapters for integration tests.
//!
//! Every actuator call, current sample and sleep is appended to one shared
//! journal, so tests can assert on ordering across ports (for example that
//! the servos were disabled before the next current sample).  Time only
//! moves when a test advances it or the core sleeps.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use servorig::app::events::AppEvent;
use servorig::app::ports::{
    ActuatorPort, ButtonPort, ClockPort, CurrentSensorPort, EventSink, FaultRecordPort,
    JogDirection, JogInputPort, LinkPort, StorageError,
};
use servorig::axis::AxisRegistry;
use servorig::config::{AxisConfig, SystemConfig, default_axes};
use servorig::error::{Error, Result};
use servorig::modes::{HomeMode, JogMode, ModeId, ModeMachine, PlaybackMode};
use servorig::scheduler::Scheduler;
use servorig::sequence::Sequence;

// ── Journal ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Set { channel: u8, angle: f32 },
    Enable(u8),
    Disable(u8),
    Sample,
    Sleep(u64),
}

pub type Journal = Rc<RefCell<Vec<Entry>>>;

// ── MockServos ────────────────────────────────────────────────

pub struct MockServos {
    journal: Journal,
    /// Panic on any position command to this channel.
    panic_on_channel: Rc<Cell<Option<u8>>>,
}

impl MockServos {
    pub fn new(journal: Journal, panic_on_channel: Rc<Cell<Option<u8>>>) -> Self {
        Self {
            journal,
            panic_on_channel,
        }
    }
}

impl ActuatorPort for MockServos {
    fn set_position(&mut self, channel: u8, angle: f32) {
        if self.panic_on_channel.get() == Some(channel) {
            panic!("servo {channel} driver fault");
        }
        self.journal.borrow_mut().push(Entry::Set { channel, angle });
    }

    fn enable(&mut self, channel: u8) {
        self.journal.borrow_mut().push(Entry::Enable(channel));
    }

    fn disable(&mut self, channel: u8) {
        self.journal.borrow_mut().push(Entry::Disable(channel));
    }
}

// ── MockRig (all polled ports) ────────────────────────────────

pub struct MockRig {
    journal: Journal,
    pub rx: VecDeque<u8>,
    pub tx: Vec<String>,
    pub button_down: bool,
    pub button_fails: bool,
    pub readings: VecDeque<f32>,
    pub idle_current: f32,
    pub jog: JogDirection,
    now: u64,
    /// Clear `flag` once the clock reaches `at_ms`.
    pub stop_at: Option<(u64, Arc<AtomicBool>)>,
}

#[allow(dead_code)]
impl MockRig {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            rx: VecDeque::new(),
            tx: Vec::new(),
            button_down: false,
            button_fails: false,
            readings: VecDeque::new(),
            idle_current: 0.5,
            jog: JogDirection::Neutral,
            now: 0,
            stop_at: None,
        }
    }

    pub fn send(&mut self, text: &str) {
        self.rx.extend(text.bytes());
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    pub fn status_lines(&self) -> Vec<serde_json::Value> {
        self.tx
            .iter()
            .map(|l| {
                let json = l
                    .strip_prefix("STATUS:")
                    .and_then(|j| j.strip_suffix('\n'))
                    .expect("status line framing");
                serde_json::from_str(json).expect("status line is JSON")
            })
            .collect()
    }
}

impl LinkPort for MockRig {
    fn has_data(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.tx.push(line.to_owned());
        Ok(())
    }
}

impl ButtonPort for MockRig {
    fn is_pressed(&mut self) -> Result<bool> {
        if self.button_fails {
            return Err(Error::Hal("button pin read"));
        }
        Ok(self.button_down)
    }
}

impl CurrentSensorPort for MockRig {
    fn sample(&mut self) -> f32 {
        self.journal.borrow_mut().push(Entry::Sample);
        self.readings.pop_front().unwrap_or(self.idle_current)
    }
}

impl JogInputPort for MockRig {
    fn direction(&mut self) -> JogDirection {
        self.jog
    }
}

impl ClockPort for MockRig {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.journal.borrow_mut().push(Entry::Sleep(ms));
        self.now += ms;
        if let Some((at, flag)) = &self.stop_at {
            if self.now >= *at {
                flag.store(false, Ordering::SeqCst);
            }
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockFaultStore ────────────────────────────────────────────

#[derive(Default)]
pub struct MockFaultStore {
    pub line: Option<String>,
}

impl FaultRecordPort for MockFaultStore {
    fn persist(&mut self, line: &str) -> core::result::Result<(), StorageError> {
        self.line = Some(line.to_owned());
        Ok(())
    }
}

// ── Fixture ───────────────────────────────────────────────────

pub struct Fixture {
    pub sched: Scheduler<MockServos>,
    pub rig: MockRig,
    pub sink: RecordingSink,
    pub journal: Journal,
    /// Arm to make the servo bank panic on a channel.
    pub servo_fault: Rc<Cell<Option<u8>>>,
}

#[allow(dead_code)]
impl Fixture {
    /// Five default axes with homes 0, 10, 20, 30, 40 and a 3-frame
    /// sequence, started in HOME.
    pub fn started() -> Self {
        Self::with(SystemConfig::default(), three_frames())
    }

    /// Started in HOME with `config` and `sequence`; start-up calls and
    /// events are cleared.
    pub fn with(config: SystemConfig, sequence: Sequence) -> Self {
        let mut fx = Self::unstarted(config, sequence, ModeId::Home);
        fx.sched.start(&mut fx.rig, &mut fx.sink).expect("start");
        fx.journal.borrow_mut().clear();
        fx.sink.events.clear();
        fx
    }

    /// Assembled with `initial` as the first mode, nothing started yet.
    pub fn unstarted(config: SystemConfig, sequence: Sequence, initial: ModeId) -> Self {
        let journal: Journal = Rc::default();
        let servo_fault = Rc::new(Cell::new(None));
        let servos = MockServos::new(journal.clone(), servo_fault.clone());
        let axes = AxisRegistry::new(&axis_configs(), servos);
        let modes = ModeMachine::new(
            HomeMode::new(),
            JogMode::new(&config),
            PlaybackMode::new(sequence, config.frame_rate),
            initial,
        );
        let sched = Scheduler::new(&config, axes, modes);
        let rig = MockRig::new(journal.clone());
        let sink = RecordingSink::default();
        Self {
            sched,
            rig,
            sink,
            journal,
            servo_fault,
        }
    }

    pub fn tick(&mut self) {
        self.sched.tick(&mut self.rig, &mut self.sink);
    }

    /// Advance the clock by `ms`, then tick.
    pub fn tick_after(&mut self, ms: u64) {
        self.rig.advance(ms);
        self.tick();
    }

    pub fn actuator_entries(&self) -> Vec<Entry> {
        self.journal
            .borrow()
            .iter()
            .filter(|e| matches!(e, Entry::Set { .. } | Entry::Enable(_) | Entry::Disable(_)))
            .cloned()
            .collect()
    }

    pub fn clear_journal(&mut self) {
        self.journal.borrow_mut().clear();
    }
}

pub fn axis_configs() -> Vec<AxisConfig> {
    let mut cfg = default_axes();
    for (i, axis) in cfg.iter_mut().enumerate() {
        axis.home = i as f32 * 10.0;
    }
    cfg
}

/// Two frames one position short of the five-axis rig.
pub fn narrow_frames() -> Sequence {
    Sequence::new(4, vec![vec![0.0; 4]; 2]).expect("equal-width frames")
}

/// Three frames; frame `i` puts every axis at `i * 10 + 5` degrees.
pub fn three_frames() -> Sequence {
    Sequence::new(5, (0..3).map(|i| vec![i as f32 * 10.0 + 5.0; 5]).collect())
        .expect("equal-width frames")
}
