//! Fuzz target for the consensus consistency rule in crossval-domain.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

#[derive(Arbitrary, Debug, Clone)]
enum FuzzOutcome {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Error(u8),
}

impl FuzzOutcome {
    fn to_outcome(&self) -> crossval_types::Outcome {
        use crossval_types::{ErrorKind, Outcome, Value};
        match self {
            FuzzOutcome::Int(i) => Outcome::Value(Value::Int(*i)),
            FuzzOutcome::Float(f) => Outcome::Value(Value::Float(*f)),
            FuzzOutcome::Str(s) => Outcome::Value(Value::Str(s.clone())),
            FuzzOutcome::Bool(b) => Outcome::Value(Value::Bool(*b)),
            FuzzOutcome::Error(k) => Outcome::Error(match k % 5 {
                0 => ErrorKind::DivisionByZero,
                1 => ErrorKind::Overflow,
                2 => ErrorKind::InvalidInput,
                3 => ErrorKind::OutOfRange,
                _ => ErrorKind::TypeMismatch,
            }),
        }
    }
}

#[derive(Arbitrary, Debug)]
struct ConsistencyInput {
    outcomes: Vec<(String, FuzzOutcome)>,
    tolerance: f64,
}

fuzz_target!(|input: ConsistencyInput| {
    let outcomes: BTreeMap<String, crossval_types::Outcome> = input
        .outcomes
        .iter()
        .map(|(name, o)| (name.clone(), o.to_outcome()))
        .collect();

    let _ = crossval_domain::check_consistency(&outcomes, input.tolerance);
});
