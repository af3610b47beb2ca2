//! Validation and comparison workflows.
//!
//! This crate wires the pure comparator and consistency rule from
//! `crossval-domain` to actual formula executions: it runs every case
//! against the implementations, times the calls, and aggregates the
//! verdicts into reports. Time itself comes in through the [`Clock`]
//! seam so runs are reproducible under test.

mod render;

pub use render::{
    render_comparison_document, render_comparison_markdown, render_markdown,
    render_validation_document,
};

use crossval_domain::{
    check_consistency, compare_outputs, summarize_discrepancies, summarize_inconsistencies,
    ComparePolicy, Formula,
};
use crossval_types::{
    ComparisonReport, ComparisonResult, Outcome, TestCase, TestResult, ValidationReport,
    DEFAULT_TOLERANCE,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// Wall-clock source for report timestamps.
pub trait Clock {
    fn now_rfc3339(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("comparison needs at least two implementations, got {found}")]
    TooFewImplementations { found: usize },
}

impl From<ValidatorError> for crossval_error::Error {
    fn from(err: ValidatorError) -> Self {
        crossval_error::Error::Validator(err.to_string())
    }
}

/// One candidate validated against one reference over a suite of cases.
pub struct ValidationRun<'a> {
    pub reference_name: String,
    pub reference: &'a dyn Formula,
    pub candidate_name: String,
    pub candidate: &'a dyn Formula,
    pub cases: &'a [TestCase],
    pub metadata: BTreeMap<String, String>,
}

/// N implementations compared against each other over a suite of cases.
pub struct ComparisonRun<'a> {
    pub implementations: Vec<(String, &'a dyn Formula)>,
    pub cases: &'a [TestCase],
    pub metadata: BTreeMap<String, String>,
}

/// The executor behind `validate` and `compare`.
pub struct CrossValidator<C = SystemClock> {
    default_tolerance: f64,
    clock: C,
}

impl CrossValidator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for CrossValidator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CrossValidator<C> {
    pub fn with_clock(clock: C) -> Self {
        CrossValidator {
            default_tolerance: DEFAULT_TOLERANCE,
            clock,
        }
    }

    /// Fallback tolerance for cases that declare neither precision nor
    /// tolerance of their own.
    pub fn default_tolerance(mut self, tolerance: f64) -> Self {
        self.default_tolerance = tolerance;
        self
    }

    /// Run every case against reference and candidate and aggregate.
    ///
    /// The expected side of each comparison is the case's own declared
    /// expectation when present; otherwise the reference outcome stands in.
    /// Per-result timing covers the candidate call only; the report's
    /// `execution_time_ms` spans the whole loop including reference calls.
    pub fn validate_implementation(&self, run: &ValidationRun<'_>) -> ValidationReport {
        let started = Instant::now();

        let mut results = Vec::with_capacity(run.cases.len());
        for case in run.cases {
            results.push(self.validate_case(run, case));
        }

        let total = results.len() as u32;
        let passed = results.iter().filter(|r| r.passed()).count() as u32;

        ValidationReport {
            id: uuid::Uuid::new_v4().to_string(),
            implementation_name: run.candidate_name.clone(),
            reference_name: run.reference_name.clone(),
            total_tests: total,
            passed,
            failed: total - passed,
            discrepancy_summary: summarize_discrepancies(&results),
            results,
            execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            timestamp: self.clock.now_rfc3339(),
            metadata: run.metadata.clone(),
        }
    }

    fn validate_case(&self, run: &ValidationRun<'_>, case: &TestCase) -> TestResult {
        let (expected_output, expected_exception) =
            if case.expected_output.is_some() || case.expected_exception.is_some() {
                (case.expected_output.clone(), case.expected_exception.clone())
            } else {
                match run.reference.evaluate(&case.inputs) {
                    Ok(value) => (Some(value), None),
                    Err(kind) => (None, Some(kind)),
                }
            };

        let call_started = Instant::now();
        let candidate = run.candidate.evaluate(&case.inputs);
        let execution_time_ms = call_started.elapsed().as_secs_f64() * 1000.0;

        let (actual_output, actual_exception) = match candidate {
            Ok(value) => (Some(value), None),
            Err(kind) => (None, Some(kind)),
        };

        let policy = ComparePolicy::for_case(case, Some(self.default_tolerance));
        let verdict = compare_outputs(
            expected_output.as_ref(),
            actual_output.as_ref(),
            expected_exception.as_ref(),
            actual_exception.as_ref(),
            &policy,
        );

        TestResult {
            case_id: case.id.clone(),
            case_name: case.name.clone(),
            category: case.category,
            implementation: run.candidate_name.clone(),
            expected_output,
            expected_exception,
            actual_output,
            actual_exception,
            matched: verdict.matched,
            discrepancy: verdict.discrepancy,
            error_message: verdict.message,
            execution_time_ms,
        }
    }

    /// Run every case against all implementations and apply the consensus
    /// consistency rule per case.
    pub fn compare_implementations(
        &self,
        run: &ComparisonRun<'_>,
    ) -> Result<ComparisonReport, ValidatorError> {
        if run.implementations.len() < 2 {
            return Err(ValidatorError::TooFewImplementations {
                found: run.implementations.len(),
            });
        }

        let started = Instant::now();

        let mut results = Vec::with_capacity(run.cases.len());
        for case in run.cases {
            let mut outcomes = BTreeMap::new();
            for (name, formula) in &run.implementations {
                outcomes.insert(name.clone(), Outcome::from_result(formula.evaluate(&case.inputs)));
            }

            let tolerance = case.tolerance.unwrap_or(self.default_tolerance);
            let verdict = check_consistency(&outcomes, tolerance);
            results.push(ComparisonResult {
                case_id: case.id.clone(),
                case_name: case.name.clone(),
                category: case.category,
                outcomes,
                consistent: verdict.consistent,
                max_discrepancy: verdict.max_discrepancy,
                mismatch: verdict.mismatch,
                message: verdict.message,
            });
        }

        let total = results.len() as u32;
        let consistent = results.iter().filter(|r| r.consistent).count() as u32;

        Ok(ComparisonReport {
            id: uuid::Uuid::new_v4().to_string(),
            implementation_names: run
                .implementations
                .iter()
                .map(|(name, _)| name.clone())
                .collect(),
            total_tests: total,
            consistent,
            inconsistent: total - consistent,
            inconsistency_summary: summarize_inconsistencies(&results),
            results,
            execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            timestamp: self.clock.now_rfc3339(),
            metadata: run.metadata.clone(),
        })
    }
}
