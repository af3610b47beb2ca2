//! Fuzz target for the test-suite document parser.
//!
//! Parsing untrusted bytes may fail, but must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<crossval_types::TestSuiteDoc>(data);
});
