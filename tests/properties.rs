//! Cross-crate properties checked at the workspace level.

use crossval::{
    CategoryCounts, Clock, CrossValidator, ErrorKind, FormulaSpec, Inputs, ParamType,
    ParameterSpec, TestCaseGenerator, TestCategory, ValidationRun, Value,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

struct FixedClock;

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        "2026-02-01T00:00:00Z".to_string()
    }
}

fn get(inputs: &Inputs, name: &str) -> Result<f64, ErrorKind> {
    inputs
        .get(name)
        .ok_or(ErrorKind::InvalidInput)?
        .as_f64()
        .ok_or(ErrorKind::TypeMismatch)
}

/// Re-running a validation with a fixed clock changes only the report id
/// and the measured timings.
#[test]
fn validation_is_idempotent_modulo_id_and_timing() {
    let formula = |inputs: &Inputs| -> Result<Value, ErrorKind> {
        Ok(Value::Float(get(inputs, "principal")? * get(inputs, "rate")?))
    };
    let cases = vec![
        crossval::TestCase::builder("a", "case a", TestCategory::Normal)
            .input("principal", 1000.0)
            .input("rate", 0.05)
            .expected_output(50.0)
            .build()
            .unwrap(),
        crossval::TestCase::builder("b", "case b", TestCategory::Error)
            .input("principal", 1000.0)
            .input("rate", 0.05)
            .expected_exception(ErrorKind::OutOfRange)
            .build()
            .unwrap(),
    ];

    let make_run = || ValidationRun {
        reference_name: "reference".to_string(),
        reference: &formula,
        candidate_name: "candidate".to_string(),
        candidate: &formula,
        cases: &cases,
        metadata: BTreeMap::new(),
    };

    let first = CrossValidator::with_clock(FixedClock).validate_implementation(&make_run());
    let second = CrossValidator::with_clock(FixedClock).validate_implementation(&make_run());

    assert_ne!(first.id, second.id);
    assert_eq!(first.timestamp, second.timestamp);
    assert_eq!(first.total_tests, second.total_tests);
    assert_eq!(first.passed, second.passed);
    assert_eq!(first.failed, second.failed);
    assert_eq!(first.discrepancy_summary, second.discrepancy_summary);
    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(a.matched, b.matched);
        assert_eq!(a.discrepancy, b.discrepancy);
        assert_eq!(a.actual_output, b.actual_output);
        assert_eq!(a.actual_exception, b.actual_exception);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// passed + failed always equals total_tests, pass_rate stays in
    /// [0, 100], and the discrepancy summary covers exactly the results
    /// that carry a discrepancy.
    #[test]
    fn report_aggregates_are_internally_consistent(drifts in prop::collection::vec(-1.0e3f64..1.0e3, 0..20)) {
        let cases: Vec<crossval::TestCase> = drifts
            .iter()
            .enumerate()
            .map(|(i, _)| {
                crossval::TestCase::builder(format!("c{i}"), format!("case {i}"), TestCategory::Normal)
                    .input("principal", 1000.0 + i as f64)
                    .input("rate", 0.05)
                    .expected_output((1000.0 + i as f64) * 0.05)
                    .build()
                    .unwrap()
            })
            .collect();

        let drifted = drifts.clone();
        let candidate = move |inputs: &Inputs| -> Result<Value, ErrorKind> {
            let principal = get(inputs, "principal")?;
            let index = (principal - 1000.0) as usize;
            Ok(Value::Float(principal * 0.05 + drifted[index]))
        };
        let reference = |inputs: &Inputs| -> Result<Value, ErrorKind> {
            Ok(Value::Float(get(inputs, "principal")? * 0.05))
        };

        let report = CrossValidator::with_clock(FixedClock).validate_implementation(&ValidationRun {
            reference_name: "reference".to_string(),
            reference: &reference,
            candidate_name: "candidate".to_string(),
            candidate: &candidate,
            cases: &cases,
            metadata: BTreeMap::new(),
        });

        prop_assert_eq!(report.passed + report.failed, report.total_tests);
        prop_assert_eq!(report.total_tests as usize, cases.len());
        let rate = report.pass_rate();
        prop_assert!((0.0..=100.0).contains(&rate));
        prop_assert_eq!(report.success(), report.failed == 0);

        let with_discrepancy = report.results.iter().filter(|r| r.discrepancy.is_some()).count();
        prop_assert_eq!(report.discrepancy_summary.numeric_tests as usize, with_discrepancy);
        prop_assert!(report.discrepancy_summary.nonzero <= report.discrepancy_summary.numeric_tests);
    }

    /// Any suite generated from a well-formed spec validates clean against
    /// an implementation that honors the spec's declared domain.
    #[test]
    fn generated_suites_validate_clean_against_conforming_impl(
        lo in 0.0f64..100.0,
        width in 1.0f64..1000.0,
        per_category in 1u32..6,
    ) {
        let hi = lo + width;
        let spec = FormulaSpec {
            id: "scaled".to_string(),
            name: None,
            parameters: vec![ParameterSpec {
                name: "x".to_string(),
                param_type: ParamType::Float,
                min: Some(lo),
                max: Some(hi),
            }],
            dependencies: vec![],
        };

        let mut counts = CategoryCounts::new();
        for category in TestCategory::ALL {
            counts.insert(category, per_category);
        }
        let cases = TestCaseGenerator::default()
            .generate_for_formula(&spec, &counts)
            .unwrap();

        // Honors the declared domain: wrong types and out-of-range inputs
        // are rejected with the kinds the generator expects.
        let conforming = move |inputs: &Inputs| -> Result<Value, ErrorKind> {
            let value = match inputs.get("x").ok_or(ErrorKind::InvalidInput)? {
                Value::Int(i) => *i as f64,
                Value::Float(f) => *f,
                _ => return Err(ErrorKind::TypeMismatch),
            };
            if value < lo || value > hi {
                return Err(ErrorKind::OutOfRange);
            }
            Ok(Value::Float(value * 2.0))
        };

        let report = CrossValidator::with_clock(FixedClock).validate_implementation(&ValidationRun {
            reference_name: "reference".to_string(),
            reference: &conforming,
            candidate_name: "candidate".to_string(),
            candidate: &conforming,
            cases: &cases,
            metadata: BTreeMap::new(),
        });

        prop_assert!(report.success(), "failed: {:?}", report.failed_tests());
    }
}
