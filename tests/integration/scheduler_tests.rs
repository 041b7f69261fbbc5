//! Full-tick behaviour of the scheduler: step ordering, mode switching by
//! button and command, status cadence, fault isolation and shutdown.

use servorig::app::events::AppEvent;
use servorig::config::SystemConfig;
use servorig::error::{Error, ModePhase, RangeError};
use servorig::modes::ModeId;

use crate::mock_hw::{Entry, Fixture, MockFaultStore, narrow_frames, three_frames};

#[test]
fn short_press_cycles_to_next_mode() {
    let mut fx = Fixture::started();
    fx.rig.button_down = true;
    fx.tick_after(10);
    assert_eq!(fx.sched.modes().active(), ModeId::Home, "nothing fires while held");

    fx.rig.button_down = false;
    fx.tick_after(200);
    assert_eq!(fx.sched.modes().active(), ModeId::Jog);
    assert!(fx.sink.events.contains(&AppEvent::ModeChanged {
        from: ModeId::Home,
        to: ModeId::Jog
    }));
}

#[test]
fn short_presses_wrap_around_all_modes() {
    let mut fx = Fixture::started();
    for expected in [ModeId::Jog, ModeId::Playback, ModeId::Home] {
        fx.rig.button_down = true;
        fx.tick_after(10);
        fx.rig.button_down = false;
        fx.tick_after(10);
        assert_eq!(fx.sched.modes().active(), expected);
    }
}

#[test]
fn long_press_in_playback_restarts_at_frame_zero() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:2\n");
    fx.tick();
    assert_eq!(fx.sched.modes().active(), ModeId::Playback);

    // 30 fps: one frame is due every ~33 ms.
    fx.tick_after(40);
    fx.tick_after(40);
    assert_eq!(fx.sched.modes().playback().current_frame(), 2);

    fx.rig.button_down = true;
    fx.tick_after(10);
    fx.rig.button_down = false;
    fx.tick_after(1100);

    assert_eq!(fx.sched.modes().active(), ModeId::Playback);
    assert_eq!(fx.sched.modes().playback().current_frame(), 0);
    let last = fx.rig.status_lines().pop().expect("status emitted");
    assert_eq!(last["frame"], 0);
}

#[test]
fn long_press_in_home_keeps_mode() {
    let mut fx = Fixture::started();
    fx.rig.button_down = true;
    fx.tick_after(10);
    fx.rig.button_down = false;
    fx.tick_after(1500);

    assert_eq!(fx.sched.modes().active(), ModeId::Home);
    assert_eq!(fx.sched.modes().switch_count(), 0);
}

#[test]
fn status_every_100_ms_with_expected_shape() {
    let mut fx = Fixture::started();
    for _ in 0..9 {
        fx.tick_after(10);
    }
    assert!(fx.rig.tx.is_empty());

    fx.tick_after(10);
    let lines = fx.rig.status_lines();
    assert_eq!(lines.len(), 1);

    let status = &lines[0];
    assert_eq!(status["mode"], "HOME");
    assert_eq!(status["overloaded"], false);
    assert!(status["current"].is_number());
    assert!(status.get("frame").is_none());
    assert!(status.get("total_frames").is_none());

    let axes = status["axes"].as_array().expect("axes array");
    assert_eq!(axes.len(), 5);
    assert_eq!(axes[2]["name"], "Axis 3");
    assert_eq!(axes[2]["position"], 20.0);
    assert_eq!(axes[2]["min"], -90.0);
    assert_eq!(axes[2]["max"], 90.0);
    assert_eq!(axes[2]["home"], 20.0);
}

#[test]
fn status_carries_frame_only_in_playback() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:2\n");
    fx.tick();
    fx.tick_after(100);

    let status = fx.rig.status_lines().pop().expect("status emitted");
    assert_eq!(status["mode"], "PLAYBACK");
    assert_eq!(status["total_frames"], 3);
    assert!(status["frame"].is_u64());
}

#[test]
fn playback_applies_frames_and_loops() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:2\n");
    fx.tick();
    fx.clear_journal();

    // Steps due at 40, 80, 120 ms → frames 0, 1, 2, then 160 ms → frame 0.
    for _ in 0..4 {
        fx.tick_after(40);
    }
    let firsts: Vec<f32> = fx
        .actuator_entries()
        .iter()
        .filter_map(|e| match e {
            Entry::Set { channel: 0, angle } => Some(*angle),
            _ => None,
        })
        .collect();
    assert_eq!(firsts, vec![5.0, 15.0, 25.0, 5.0]);
}

#[test]
fn button_fault_is_isolated_from_later_steps() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:2\n");
    fx.tick();
    fx.clear_journal();

    fx.rig.button_fails = true;
    fx.tick_after(100);

    assert!(fx.sink.events.contains(&AppEvent::StepFailed {
        step: "button",
        error: Error::Hal("button pin read"),
    }));
    assert_eq!(fx.sched.step_failures(), 1);
    assert_eq!(fx.rig.status_lines().len(), 1, "status still emitted");
    assert!(
        !fx.actuator_entries().is_empty(),
        "mode update still applied a frame"
    );
}

#[test]
fn heartbeat_every_hundred_iterations() {
    let mut fx = Fixture::started();
    for _ in 0..250 {
        fx.tick();
    }
    let beats: Vec<&AppEvent> = fx
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Heartbeat { .. }))
        .collect();
    assert_eq!(
        beats,
        vec![
            &AppEvent::Heartbeat {
                iteration: 100,
                buffered_bytes: 0
            },
            &AppEvent::Heartbeat {
                iteration: 200,
                buffered_bytes: 0
            },
        ]
    );
}

#[test]
fn run_sleeps_between_ticks_and_stops_on_flag() {
    let mut fx = Fixture::started();
    fx.rig.stop_at = Some((50, fx.sched.running_flag()));
    fx.sched.run(&mut fx.rig, &mut fx.sink);

    assert_eq!(fx.sched.iteration(), 5);
    let sleeps = fx
        .journal
        .borrow()
        .iter()
        .filter(|e| **e == Entry::Sleep(10))
        .count();
    assert_eq!(sleeps, 5);
}

#[test]
fn shutdown_disables_every_axis() {
    let mut fx = Fixture::started();
    fx.sched.shutdown(&mut fx.sink);

    assert_eq!(
        fx.actuator_entries(),
        (0..5).map(Entry::Disable).collect::<Vec<_>>()
    );
    assert!(!fx.sched.axes().is_enabled());
    assert_eq!(fx.sink.events.last(), Some(&AppEvent::Shutdown));
}

#[test]
fn start_enables_then_homes() {
    let fx = Fixture::started();
    assert!(fx.sched.axes().is_enabled());
    assert_eq!(fx.sched.modes().active(), ModeId::Home);
    assert!(fx.sched.axes().iter().all(|a| a.target() == a.home));
}

#[test]
fn failing_enter_still_completes_the_switch() {
    let mut fx = Fixture::with(SystemConfig::default(), narrow_frames());
    fx.rig.send("SET_MODE:2\n");
    fx.tick();

    assert_eq!(fx.sched.modes().active(), ModeId::Playback);
    assert!(fx.sink.events.contains(&AppEvent::StepFailed {
        step: "mode enter",
        error: Error::Mode {
            mode: ModeId::Playback,
            phase: ModePhase::Enter,
            source: Box::new(Error::Range(RangeError::FrameWidth {
                expected: 5,
                found: 4
            })),
        },
    }));
    assert!(fx.sink.events.contains(&AppEvent::ModeChanged {
        from: ModeId::Home,
        to: ModeId::Playback
    }));
}

#[test]
fn failing_update_is_isolated_and_loop_continues() {
    let mut fx = Fixture::with(SystemConfig::default(), narrow_frames());
    fx.rig.send("SET_MODE:2\n");
    fx.tick();
    fx.sink.events.clear();
    fx.clear_journal();

    fx.tick_after(100);
    let update_failures = fx.sink.count(|e| {
        matches!(
            e,
            AppEvent::StepFailed {
                step: "mode update",
                error: Error::Mode {
                    phase: ModePhase::Update,
                    ..
                }
            }
        )
    });
    assert_eq!(update_failures, 1);
    assert_eq!(fx.rig.status_lines().len(), 1, "status step still ran");
    assert!(fx.actuator_entries().is_empty(), "no partial frame applied");

    fx.tick_after(10);
    assert_eq!(fx.sched.iteration(), 3);
    assert_eq!(fx.sched.modes().active(), ModeId::Playback);
}

#[test]
fn supervise_stops_cleanly_on_interrupt() {
    let mut fx = Fixture::unstarted(SystemConfig::default(), three_frames(), ModeId::Home);
    fx.rig.stop_at = Some((50, fx.sched.running_flag()));
    let mut store = MockFaultStore::default();

    assert_eq!(fx.sched.supervise(&mut fx.rig, &mut fx.sink, &mut store), Ok(()));
    assert_eq!(fx.sched.iteration(), 5);
    assert!(store.line.is_none());
    assert!(!fx.sched.axes().is_enabled());
    assert_eq!(fx.sink.events.last(), Some(&AppEvent::Shutdown));
}

#[test]
fn supervise_shuts_down_when_start_fails() {
    let mut fx = Fixture::unstarted(SystemConfig::default(), narrow_frames(), ModeId::Playback);
    let mut store = MockFaultStore::default();

    let result = fx.sched.supervise(&mut fx.rig, &mut fx.sink, &mut store);
    assert!(matches!(
        result,
        Err(Error::Mode {
            mode: ModeId::Playback,
            phase: ModePhase::Enter,
            ..
        })
    ));
    assert_eq!(fx.sched.iteration(), 0, "loop never ran");
    assert!(!fx.sched.axes().is_enabled());
    assert!(store.line.is_none());
    assert_eq!(fx.sink.events.last(), Some(&AppEvent::Shutdown));

    let entries = fx.actuator_entries();
    assert_eq!(entries.last(), Some(&Entry::Disable(4)));
    assert!(!entries.iter().any(|e| matches!(e, Entry::Set { .. })));
}

#[test]
fn escaped_panic_is_recorded_as_fatal_then_shut_down() {
    // JOG enters without moving anything, so the fault fires in the loop.
    let mut fx = Fixture::unstarted(SystemConfig::default(), three_frames(), ModeId::Jog);
    fx.servo_fault.set(Some(0));
    fx.rig.advance(1234);
    fx.rig.send("HOME_ALL\n");
    let mut store = MockFaultStore::default();

    let result = fx.sched.supervise(&mut fx.rig, &mut fx.sink, &mut store);

    assert_eq!(result, Err(Error::Fatal("servo 0 driver fault".into())));
    assert_eq!(fx.sched.iteration(), 1);
    assert_eq!(store.line.as_deref(), Some("[1234 ms] servo 0 driver fault"));
    let entries = fx.actuator_entries();
    assert_eq!(
        entries[entries.len() - 5..],
        (0..5).map(Entry::Disable).collect::<Vec<_>>()[..]
    );
    assert!(!fx.sched.axes().is_enabled());
    assert_eq!(fx.sink.events.last(), Some(&AppEvent::Shutdown));
}
