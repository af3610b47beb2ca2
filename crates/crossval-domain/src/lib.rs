//! Domain logic for crossval.
//!
//! This crate is intentionally I/O-free: it decides whether outputs match.
//! The comparator and the consistency rule are total functions: errors of
//! the system under test arrive here as values, never as panics.

use crossval_types::{
    ComparisonResult, DiscrepancySummary, ErrorKind, InconsistencySummary, Inputs, MismatchKind,
    Outcome, TestResult, Value,
};
use statrs::statistics::{Data, Distribution, Max, OrderStatistics};
use std::collections::BTreeMap;

/// A formula implementation under test (or acting as reference).
///
/// The capability boundary for arbitrary callables: a named-parameter bag
/// in, a value or a tagged error out. Implementations must not panic;
/// everything they want to report travels through `ErrorKind`.
pub trait Formula {
    fn evaluate(&self, inputs: &Inputs) -> Result<Value, ErrorKind>;
}

impl<F> Formula for F
where
    F: Fn(&Inputs) -> Result<Value, ErrorKind>,
{
    fn evaluate(&self, inputs: &Inputs) -> Result<Value, ErrorKind> {
        self(inputs)
    }
}

/// Equality policy for one comparison.
///
/// Precision, when present, is authoritative: rounding-based equality and
/// tolerance-based distance are different correctness notions and are never
/// merged. With neither a case tolerance nor a validator default, numeric
/// equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComparePolicy {
    pub precision: Option<u32>,
    pub tolerance: Option<f64>,
    pub default_tolerance: Option<f64>,
}

impl ComparePolicy {
    pub fn exact() -> Self {
        Self::default()
    }

    /// Case-declared knobs plus the validator's default tolerance.
    pub fn for_case(case: &crossval_types::TestCase, default_tolerance: Option<f64>) -> Self {
        ComparePolicy {
            precision: case.precision,
            tolerance: case.tolerance,
            default_tolerance,
        }
    }

    fn effective_tolerance(&self) -> Option<f64> {
        self.tolerance.or(self.default_tolerance)
    }
}

/// Verdict of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOutcome {
    pub matched: bool,

    /// |expected - actual| when both sides were numeric, even on a match.
    pub discrepancy: Option<f64>,

    /// Mismatch explanation; None on a match.
    pub message: Option<String>,
}

impl CompareOutcome {
    fn matched(discrepancy: Option<f64>) -> Self {
        CompareOutcome {
            matched: true,
            discrepancy,
            message: None,
        }
    }

    fn mismatch(discrepancy: Option<f64>, message: String) -> Self {
        CompareOutcome {
            matched: false,
            discrepancy,
            message: Some(message),
        }
    }
}

/// The output oracle.
///
/// Decision order:
/// 1. expected error set: matched iff the actual error kind equals it exactly.
/// 2. actual error set (none expected): mismatch.
/// 3. both values numeric: discrepancy = |e - a|; precision rounding, else
///    tolerance distance, else exact equality.
/// 4. otherwise: exact equality, element-wise for sequences.
pub fn compare_outputs(
    expected: Option<&Value>,
    actual: Option<&Value>,
    expected_error: Option<&ErrorKind>,
    actual_error: Option<&ErrorKind>,
    policy: &ComparePolicy,
) -> CompareOutcome {
    if let Some(want) = expected_error {
        return match actual_error {
            Some(got) if got == want => CompareOutcome::matched(None),
            Some(got) => CompareOutcome::mismatch(
                None,
                format!("expected error {want}, got {got}"),
            ),
            None => CompareOutcome::mismatch(
                None,
                format!("expected error {want} but the call returned a value"),
            ),
        };
    }

    if let Some(got) = actual_error {
        return CompareOutcome::mismatch(None, format!("unexpected error: {got}"));
    }

    match (expected, actual) {
        (Some(e), Some(a)) => compare_values(e, a, policy),
        (None, None) => CompareOutcome::matched(None),
        (Some(e), None) => CompareOutcome::mismatch(None, format!("expected {e}, got nothing")),
        (None, Some(a)) => CompareOutcome::mismatch(None, format!("expected no value, got {a}")),
    }
}

/// Value-level comparison; recursion point for sequences.
fn compare_values(expected: &Value, actual: &Value, policy: &ComparePolicy) -> CompareOutcome {
    if let (Some(e), Some(a)) = (expected.as_f64(), actual.as_f64()) {
        return compare_numeric(e, a, policy);
    }

    match (expected, actual) {
        (Value::List(es), Value::List(actuals)) => {
            if es.len() != actuals.len() {
                return CompareOutcome::mismatch(
                    None,
                    format!("sequence length mismatch: {} vs {}", es.len(), actuals.len()),
                );
            }
            for (i, (e, a)) in es.iter().zip(actuals.iter()).enumerate() {
                let element = compare_values(e, a, policy);
                if !element.matched {
                    let detail = element
                        .message
                        .unwrap_or_else(|| "values differ".to_string());
                    return CompareOutcome::mismatch(None, format!("element {i}: {detail}"));
                }
            }
            CompareOutcome::matched(None)
        }
        (e, a) if e == a => CompareOutcome::matched(None),
        (e, a) => CompareOutcome::mismatch(None, format!("values differ: {e} vs {a}")),
    }
}

fn compare_numeric(expected: f64, actual: f64, policy: &ComparePolicy) -> CompareOutcome {
    let discrepancy = (expected - actual).abs();

    if let Some(places) = policy.precision {
        let re = round_to(expected, places);
        let ra = round_to(actual, places);
        return if re == ra {
            CompareOutcome::matched(Some(discrepancy))
        } else {
            CompareOutcome::mismatch(
                Some(discrepancy),
                format!("values differ at {places} decimal places: {expected} vs {actual}"),
            )
        };
    }

    if let Some(tolerance) = policy.effective_tolerance() {
        return if discrepancy <= tolerance {
            CompareOutcome::matched(Some(discrepancy))
        } else {
            CompareOutcome::mismatch(
                Some(discrepancy),
                format!("discrepancy {discrepancy} exceeds tolerance {tolerance}"),
            )
        };
    }

    if expected == actual {
        CompareOutcome::matched(Some(discrepancy))
    } else {
        CompareOutcome::mismatch(
            Some(discrepancy),
            format!("values differ: {expected} vs {actual}"),
        )
    }
}

/// Round to `places` decimal places, half away from zero.
fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(300) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Consensus verdict across N implementations for one case.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyOutcome {
    pub consistent: bool,

    /// max - min across numeric outputs; set whenever all outputs are numeric.
    pub max_discrepancy: Option<f64>,

    pub mismatch: Option<MismatchKind>,
    pub message: Option<String>,
}

impl ConsistencyOutcome {
    fn consistent(max_discrepancy: Option<f64>) -> Self {
        ConsistencyOutcome {
            consistent: true,
            max_discrepancy,
            mismatch: None,
            message: None,
        }
    }

    fn inconsistent(
        max_discrepancy: Option<f64>,
        mismatch: MismatchKind,
        message: String,
    ) -> Self {
        ConsistencyOutcome {
            consistent: false,
            max_discrepancy,
            mismatch: Some(mismatch),
            message: Some(message),
        }
    }
}

/// Pairwise-by-consensus consistency rule.
///
/// If any implementation raised, all must have raised the identical kind.
/// If none raised and every output is numeric, the spread (max - min) must
/// stay within tolerance. Otherwise all outputs must be exactly equal.
/// The verdict does not depend on map iteration order.
pub fn check_consistency(outcomes: &BTreeMap<String, Outcome>, tolerance: f64) -> ConsistencyOutcome {
    let errors: Vec<&ErrorKind> = outcomes.values().filter_map(Outcome::error).collect();

    if !errors.is_empty() {
        if errors.len() != outcomes.len() {
            return ConsistencyOutcome::inconsistent(
                None,
                MismatchKind::Exception,
                "some implementations raised errors, some returned values".to_string(),
            );
        }
        let first = errors[0];
        if errors.iter().all(|e| *e == first) {
            return ConsistencyOutcome::consistent(None);
        }
        let kinds: Vec<String> = outcomes
            .iter()
            .filter_map(|(name, o)| o.error().map(|e| format!("{name}: {e}")))
            .collect();
        return ConsistencyOutcome::inconsistent(
            None,
            MismatchKind::Exception,
            format!("implementations raised different error kinds ({})", kinds.join(", ")),
        );
    }

    let numeric: Vec<f64> = outcomes
        .values()
        .filter_map(|o| o.value().and_then(Value::as_f64))
        .collect();

    if numeric.len() == outcomes.len() && !numeric.is_empty() {
        let min = numeric.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;
        return if spread.is_nan() || spread > tolerance {
            ConsistencyOutcome::inconsistent(
                Some(spread),
                MismatchKind::Numeric,
                format!("numeric spread {spread} exceeds tolerance {tolerance}"),
            )
        } else {
            ConsistencyOutcome::consistent(Some(spread))
        };
    }

    let mut values = outcomes.iter().filter_map(|(name, o)| o.value().map(|v| (name, v)));
    // outcomes contains no errors here, so there is at least one value.
    match values.next() {
        Some((first_name, first)) => {
            for (name, value) in values {
                if value != first {
                    return ConsistencyOutcome::inconsistent(
                        None,
                        MismatchKind::NonNumeric,
                        format!("outputs differ: {name} returned {value}, {first_name} returned {first}"),
                    );
                }
            }
            ConsistencyOutcome::consistent(None)
        }
        None => ConsistencyOutcome::consistent(None),
    }
}

/// Statistics over the discrepancies recorded in a validation run.
///
/// Discrepancies are collected in result order; max/mean/median cover the
/// subset with a defined (non-null) discrepancy.
pub fn summarize_discrepancies(results: &[TestResult]) -> DiscrepancySummary {
    let values: Vec<f64> = results.iter().filter_map(|r| r.discrepancy).collect();
    summarize_values(&values)
}

fn summarize_values(values: &[f64]) -> DiscrepancySummary {
    if values.is_empty() {
        return DiscrepancySummary::default();
    }

    let nonzero = values.iter().filter(|d| **d > 0.0).count() as u32;
    let mut data = Data::new(values.to_vec());
    let median = data.median();
    let mean = data.mean();
    let max = data.max();

    DiscrepancySummary {
        numeric_tests: values.len() as u32,
        max: Some(max),
        mean,
        median: Some(median),
        nonzero,
    }
}

/// Mismatch breakdown for a comparison run.
pub fn summarize_inconsistencies(results: &[ComparisonResult]) -> InconsistencySummary {
    let mut summary = InconsistencySummary::default();

    let mut numeric_spreads: Vec<f64> = Vec::new();
    for result in results.iter().filter(|r| !r.consistent) {
        match result.mismatch {
            Some(MismatchKind::Numeric) => {
                summary.numeric_mismatches += 1;
                if let Some(spread) = result.max_discrepancy {
                    numeric_spreads.push(spread);
                }
            }
            Some(MismatchKind::NonNumeric) => summary.non_numeric_mismatches += 1,
            Some(MismatchKind::Exception) => summary.exception_mismatches += 1,
            None => summary.non_numeric_mismatches += 1,
        }
    }

    if !numeric_spreads.is_empty() {
        let data = Data::new(numeric_spreads);
        summary.max_discrepancy = Some(data.max());
        summary.mean_discrepancy = data.mean();
    }

    summary
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // Tolerance monotonicity: a numeric match at tolerance T holds at
        // every T' >= T.
        #[test]
        fn tolerance_monotonicity(
            e in -1.0e9f64..1.0e9,
            a in -1.0e9f64..1.0e9,
            t in 0.0f64..1.0e6,
            extra in 0.0f64..1.0e6,
        ) {
            let at_t = compare_numeric_matched(e, a, t);
            if at_t {
                prop_assert!(compare_numeric_matched(e, a, t + extra));
            }
        }

        // The comparator is total: arbitrary floats (including NaN and
        // infinities) never panic.
        #[test]
        fn comparator_is_total(
            e in proptest::num::f64::ANY,
            a in proptest::num::f64::ANY,
            precision in proptest::option::of(0u32..40),
            tolerance in proptest::option::of(proptest::num::f64::ANY),
        ) {
            let policy = ComparePolicy { precision, tolerance, default_tolerance: None };
            let _ = compare_outputs(
                Some(&Value::Float(e)),
                Some(&Value::Float(a)),
                None,
                None,
                &policy,
            );
        }

        // Consistency is symmetric in the implementation names: renaming
        // (reordering the map) never changes the verdict.
        #[test]
        fn consistency_is_order_independent(
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 2..6),
            tolerance in 0.0f64..10.0,
        ) {
            let forward: BTreeMap<String, Outcome> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("impl_{i}"), Outcome::Value(Value::Float(*v))))
                .collect();
            let renamed: BTreeMap<String, Outcome> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("impl_{}", values.len() - i), Outcome::Value(Value::Float(*v))))
                .collect();

            let a = check_consistency(&forward, tolerance);
            let b = check_consistency(&renamed, tolerance);
            prop_assert_eq!(a.consistent, b.consistent);
            prop_assert_eq!(a.max_discrepancy, b.max_discrepancy);
        }
    }

    fn compare_numeric_matched(e: f64, a: f64, tolerance: f64) -> bool {
        let policy = ComparePolicy {
            precision: None,
            tolerance: Some(tolerance),
            default_tolerance: None,
        };
        compare_outputs(
            Some(&Value::Float(e)),
            Some(&Value::Float(a)),
            None,
            None,
            &policy,
        )
        .matched
    }
}
