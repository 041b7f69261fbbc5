//! Fuzz target: `Command::parse`
//!
//! Arbitrary UTF-8 must either parse or be rejected, never panic.  Anything
//! that parses must start with one of the four command words.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use servorig::protocol::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if Command::parse(line).is_ok() {
        assert!(
            line == "HOME_ALL"
                || line == "RESTART_PLAYBACK"
                || line.starts_with("HOME_AXIS:")
                || line.starts_with("SET_MODE:")
        );
    }
});
