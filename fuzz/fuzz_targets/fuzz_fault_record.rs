//! Fuzz target: `FaultRecord::new` / `to_line`
//!
//! Any panic message must become exactly one line of bounded length.
//!
//! cargo fuzz run fuzz_fault_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use servorig::diagnostics::FaultRecord;

fuzz_target!(|data: &[u8]| {
    let reason = String::from_utf8_lossy(data);
    let record = FaultRecord::new(u64::from(data.len() as u32), &reason);
    let line = record.to_line();
    assert!(!line.contains('\n'));
    assert!(!line.contains('\r'));
    assert!(record.reason.len() <= 200);
});
