//! Fuzz target for the output comparator in crossval-domain.
//!
//! Structure-aware fuzzing with local Arbitrary mirror types: the
//! comparator is a total function and must never panic, whatever mix of
//! values, error kinds, and policy knobs it is handed.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone)]
enum FuzzValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FuzzValue>),
}

impl FuzzValue {
    fn to_value(&self) -> crossval_types::Value {
        match self {
            FuzzValue::Bool(b) => crossval_types::Value::Bool(*b),
            FuzzValue::Int(i) => crossval_types::Value::Int(*i),
            FuzzValue::Float(f) => crossval_types::Value::Float(*f),
            FuzzValue::Str(s) => crossval_types::Value::Str(s.clone()),
            FuzzValue::List(items) => {
                crossval_types::Value::List(items.iter().map(FuzzValue::to_value).collect())
            }
        }
    }
}

#[derive(Arbitrary, Debug, Clone)]
enum FuzzErrorKind {
    DivisionByZero,
    Overflow,
    InvalidInput,
    OutOfRange,
    TypeMismatch,
    Other(String),
}

impl FuzzErrorKind {
    fn to_kind(&self) -> crossval_types::ErrorKind {
        match self {
            FuzzErrorKind::DivisionByZero => crossval_types::ErrorKind::DivisionByZero,
            FuzzErrorKind::Overflow => crossval_types::ErrorKind::Overflow,
            FuzzErrorKind::InvalidInput => crossval_types::ErrorKind::InvalidInput,
            FuzzErrorKind::OutOfRange => crossval_types::ErrorKind::OutOfRange,
            FuzzErrorKind::TypeMismatch => crossval_types::ErrorKind::TypeMismatch,
            FuzzErrorKind::Other(s) => crossval_types::ErrorKind::Other(s.clone()),
        }
    }
}

#[derive(Arbitrary, Debug)]
struct CompareInput {
    expected: Option<FuzzValue>,
    actual: Option<FuzzValue>,
    expected_error: Option<FuzzErrorKind>,
    actual_error: Option<FuzzErrorKind>,
    precision: Option<u32>,
    tolerance: Option<f64>,
    default_tolerance: Option<f64>,
}

fuzz_target!(|input: CompareInput| {
    let expected = input.expected.as_ref().map(FuzzValue::to_value);
    let actual = input.actual.as_ref().map(FuzzValue::to_value);
    let expected_error = input.expected_error.as_ref().map(FuzzErrorKind::to_kind);
    let actual_error = input.actual_error.as_ref().map(FuzzErrorKind::to_kind);

    let policy = crossval_domain::ComparePolicy {
        precision: input.precision,
        tolerance: input.tolerance,
        default_tolerance: input.default_tolerance,
    };

    let _ = crossval_domain::compare_outputs(
        expected.as_ref(),
        actual.as_ref(),
        expected_error.as_ref(),
        actual_error.as_ref(),
        &policy,
    );
});
