//! Fuzz target: `CommandBuffer::feed`
//!
//! Drives arbitrary byte sequences into the line accumulator and asserts
//! that it never panics, never yields a line longer than its limit or
//! containing a terminator, and is always empty right after a rejected
//! byte.
//!
//! cargo fuzz run fuzz_command_buffer

#![no_main]

use libfuzzer_sys::fuzz_target;
use servorig::protocol::{CommandBuffer, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let limit = data.first().map_or(MAX_LINE_LEN, |b| usize::from(*b).max(1));
    let mut buffer = CommandBuffer::new(limit);

    for byte in data {
        match buffer.feed(*byte) {
            Ok(Some(line)) => {
                assert!(line.len() <= limit.min(MAX_LINE_LEN));
                assert!(!line.contains('\n'));
                assert!(buffer.is_empty());
            }
            Ok(None) => assert!(buffer.len() <= limit.min(MAX_LINE_LEN)),
            Err(_) => assert!(buffer.is_empty()),
        }
    }
});
