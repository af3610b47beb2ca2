//! End-to-end scenarios across the workspace crates.

use crossval::{
    Clock, CrossValidator, ComparisonRun, ErrorKind, Formula, Inputs, TestCase, TestCaseFactory,
    TestCategory, ValidationRun, Value,
};
use std::collections::BTreeMap;

struct FixedClock;

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        "2026-02-01T00:00:00Z".to_string()
    }
}

fn validator() -> CrossValidator<FixedClock> {
    CrossValidator::with_clock(FixedClock)
}

fn get(inputs: &Inputs, name: &str) -> Result<f64, ErrorKind> {
    inputs
        .get(name)
        .ok_or(ErrorKind::InvalidInput)?
        .as_f64()
        .ok_or(ErrorKind::TypeMismatch)
}

fn simple_interest(inputs: &Inputs) -> Result<Value, ErrorKind> {
    let principal = get(inputs, "principal")?;
    if principal < 0.0 {
        return Err(ErrorKind::OutOfRange);
    }
    Ok(Value::Float(principal * get(inputs, "rate")? * get(inputs, "term")?))
}

fn run<'a>(
    reference: &'a dyn Formula,
    candidate: &'a dyn Formula,
    cases: &'a [TestCase],
) -> ValidationRun<'a> {
    ValidationRun {
        reference_name: "reference".to_string(),
        reference,
        candidate_name: "candidate".to_string(),
        candidate,
        cases,
        metadata: BTreeMap::new(),
    }
}

/// An identical candidate passes the whole factory suite.
#[test]
fn identical_candidate_passes_factory_suite() {
    let cases = TestCaseFactory::simple_interest_suite().unwrap();
    let report =
        validator().validate_implementation(&run(&simple_interest, &simple_interest, &cases));

    assert_eq!(report.total_tests, cases.len() as u32);
    assert_eq!(report.passed, report.total_tests);
    assert_eq!(report.failed, 0);
    assert!(report.success());
}

/// A wildly wrong candidate records the full numeric discrepancy.
#[test]
fn wrong_candidate_records_discrepancy() {
    let cases = vec![TestCase::builder("nominal", "interest nominal", TestCategory::Normal)
        .input("principal", 1000.0)
        .input("rate", 0.05)
        .input("term", 2.0)
        .expected_output(100.0)
        .build()
        .unwrap()];

    let wrong = |_: &Inputs| -> Result<Value, ErrorKind> { Ok(Value::Float(400_000.0)) };
    let report = validator().validate_implementation(&run(&simple_interest, &wrong, &cases));

    assert_eq!(report.failed, 1);
    let result = &report.results[0];
    assert!(!result.matched);
    assert_eq!(result.discrepancy, Some(399_900.0));
}

/// Precision rounding equates values whose raw difference is nonzero.
#[test]
fn precision_rounding_equates_nearby_values() {
    let cases = vec![TestCase::builder("rounded", "interest rounded", TestCategory::Normal)
        .input("principal", 1000.0)
        .input("rate", 0.05)
        .input("term", 2.0)
        .expected_output(100.0)
        .precision(10)
        .build()
        .unwrap()];

    let near = |_: &Inputs| -> Result<Value, ErrorKind> { Ok(Value::Float(100.000_000_000_05)) };
    let report = validator().validate_implementation(&run(&simple_interest, &near, &cases));

    assert!(report.success());
    let result = &report.results[0];
    assert!(result.matched);
    // The raw difference is still recorded.
    assert!(result.discrepancy.unwrap() > 0.0);
}

/// A declared tolerance admits differences up to the bound.
#[test]
fn tolerance_admits_small_differences() {
    let cases = vec![TestCase::builder("tolerant", "interest tolerant", TestCategory::Normal)
        .input("principal", 1000.0)
        .input("rate", 0.05)
        .input("term", 2.0)
        .expected_output(100.0)
        .tolerance(0.001)
        .build()
        .unwrap()];

    let near = |_: &Inputs| -> Result<Value, ErrorKind> { Ok(Value::Float(100.0005)) };
    let report = validator().validate_implementation(&run(&simple_interest, &near, &cases));

    assert!(report.success());
    let result = &report.results[0];
    assert!(result.matched);
    let discrepancy = result.discrepancy.unwrap();
    assert!(discrepancy > 0.0 && discrepancy <= 0.001);
}

/// Three implementations where one raises and two return values.
#[test]
fn comparison_reports_partial_raise_as_inconsistent() {
    let cases = vec![TestCase::builder("nominal", "interest nominal", TestCategory::Normal)
        .input("principal", 1000.0)
        .input("rate", 0.05)
        .input("term", 2.0)
        .build()
        .unwrap()];

    let raising = |_: &Inputs| -> Result<Value, ErrorKind> { Err(ErrorKind::DivisionByZero) };
    let report = validator()
        .compare_implementations(&ComparisonRun {
            implementations: vec![
                ("a".to_string(), &simple_interest as &dyn Formula),
                ("b".to_string(), &simple_interest as &dyn Formula),
                ("c".to_string(), &raising as &dyn Formula),
            ],
            cases: &cases,
            metadata: BTreeMap::new(),
        })
        .unwrap();

    assert_eq!(report.inconsistent, 1);
    let result = &report.results[0];
    assert!(!result.consistent);
    assert!(result.message.as_deref().unwrap().contains("some"));
}

/// An empty suite must not divide by zero anywhere.
#[test]
fn empty_suite_produces_empty_report() {
    let report = validator().validate_implementation(&run(&simple_interest, &simple_interest, &[]));

    assert_eq!(report.total_tests, 0);
    assert_eq!(report.passed, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.pass_rate(), 0.0);
    assert!(report.success());

    let doc = report.to_document();
    assert_eq!(doc.pass_rate, 0.0);
    assert!(doc.failed_tests.is_empty());
}

/// Reports survive the JSON round trip through their document form.
#[test]
fn validation_document_round_trips_through_json() {
    let cases = TestCaseFactory::simple_interest_suite().unwrap();
    let report =
        validator().validate_implementation(&run(&simple_interest, &simple_interest, &cases));

    let doc = report.to_document();
    let json = serde_json::to_string(&doc).unwrap();
    let parsed: crossval::ValidationDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, doc);
    assert_eq!(parsed.schema, crossval::VALIDATION_SCHEMA_V1);
}
