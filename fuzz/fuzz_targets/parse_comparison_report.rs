//! Fuzz target for the comparison document parser.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<crossval_types::ComparisonDocument>(data);
});
