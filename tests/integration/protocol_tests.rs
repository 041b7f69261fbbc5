//! Command link → axis registry / mode machine, driven through full ticks.

use servorig::app::events::AppEvent;
use servorig::error::{Error, ParseError, RangeError};
use servorig::modes::ModeId;

use crate::mock_hw::{Entry, Fixture};

fn rejections(fx: &Fixture) -> Vec<Error> {
    fx.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandRejected(err) => Some(err.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn home_axis_out_of_range_touches_nothing() {
    let mut fx = Fixture::started();
    fx.rig.send("HOME_AXIS:7\n");
    fx.tick();

    assert!(fx.actuator_entries().is_empty());
    assert_eq!(
        rejections(&fx),
        vec![Error::Range(RangeError::AxisIndex { index: 7, count: 5 })]
    );
}

#[test]
fn home_axis_moves_only_that_axis() {
    let mut fx = Fixture::started();
    fx.rig.send("HOME_AXIS:3\n");
    fx.tick();

    assert_eq!(
        fx.actuator_entries(),
        vec![Entry::Set {
            channel: fx.sched.axes().get(3).map(|a| a.channel).unwrap(),
            angle: 30.0
        }]
    );
    assert!(rejections(&fx).is_empty());
}

#[test]
fn home_all_moves_every_axis_home() {
    let mut fx = Fixture::started();
    fx.rig.send("HOME_ALL\n");
    fx.tick();

    let sets = fx.actuator_entries();
    assert_eq!(sets.len(), 5);
    for (axis, entry) in fx.sched.axes().iter().zip(&sets) {
        assert_eq!(
            *entry,
            Entry::Set {
                channel: axis.channel,
                angle: axis.home
            }
        );
    }
}

#[test]
fn crlf_terminated_lines_are_accepted() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:1\r\n");
    fx.tick();

    assert_eq!(fx.sched.modes().active(), ModeId::Jog);
    assert!(rejections(&fx).is_empty());
}

#[test]
fn set_mode_out_of_range_is_rejected_and_mode_kept() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:5\n");
    fx.tick();

    assert_eq!(fx.sched.modes().active(), ModeId::Home);
    assert_eq!(
        rejections(&fx),
        vec![Error::Range(RangeError::ModeIndex(5))]
    );
    assert_eq!(fx.sched.modes().switch_count(), 0);
}

#[test]
fn last_set_mode_in_one_tick_wins() {
    let mut fx = Fixture::started();
    fx.rig.send("SET_MODE:1\nSET_MODE:2\n");
    fx.tick();

    assert_eq!(fx.sched.modes().active(), ModeId::Playback);
    assert_eq!(fx.sched.modes().switch_count(), 1);
}

#[test]
fn set_mode_to_active_mode_runs_full_cycle() {
    let mut fx = Fixture::started();

    // HOME → HOME re-homes every axis.
    fx.rig.send("SET_MODE:0\n");
    fx.tick();
    assert_eq!(fx.actuator_entries().len(), 5);
    assert!(fx.sink.events.contains(&AppEvent::ModeChanged {
        from: ModeId::Home,
        to: ModeId::Home
    }));

    fx.rig.send("SET_MODE:2\n");
    fx.tick_after(10);
    fx.rig.send("SET_MODE:2\n");
    fx.tick_after(10);
    assert!(fx.sink.events.contains(&AppEvent::ModeChanged {
        from: ModeId::Playback,
        to: ModeId::Playback
    }));
    assert_eq!(fx.sched.modes().switch_count(), 3);
}

#[test]
fn unknown_and_malformed_lines_are_reported() {
    let mut fx = Fixture::started();
    fx.rig.send("JUMP\nHOME_AXIS:x\n");
    fx.tick();

    assert_eq!(
        rejections(&fx),
        vec![
            Error::Parse(ParseError::UnknownCommand("JUMP".into())),
            Error::Parse(ParseError::BadArgument("HOME_AXIS")),
        ]
    );
    assert!(fx.actuator_entries().is_empty());
}

#[test]
fn partial_line_completes_on_a_later_tick() {
    let mut fx = Fixture::started();
    fx.rig.send("HOME_A");
    fx.tick();
    assert_eq!(fx.sched.link().buffered_bytes(), 6);
    assert!(fx.actuator_entries().is_empty());

    fx.rig.send("XIS:0\n");
    fx.tick_after(10);
    assert_eq!(fx.actuator_entries().len(), 1);
    assert_eq!(fx.sched.link().buffered_bytes(), 0);
}

#[test]
fn invalid_byte_drops_partial_line() {
    let mut fx = Fixture::started();
    fx.rig.send("HOME_");
    fx.rig.rx.push_back(0x00);
    fx.rig.send("ALL\n");
    fx.tick();

    assert_eq!(
        rejections(&fx),
        vec![
            Error::Parse(ParseError::InvalidByte(0x00)),
            Error::Parse(ParseError::UnknownCommand("ALL".into())),
        ]
    );
    assert!(fx.actuator_entries().is_empty());
}

#[test]
fn restart_playback_command_changes_nothing() {
    let mut fx = Fixture::started();
    fx.rig.send("RESTART_PLAYBACK\n");
    fx.tick();

    assert!(fx.actuator_entries().is_empty());
    assert!(rejections(&fx).is_empty());
    assert_eq!(fx.sched.modes().active(), ModeId::Home);
}
