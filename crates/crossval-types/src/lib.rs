//! Shared types for crossval.
//!
//! Design goal: versioned, explicit, boring.
//! These structs are used for persisted test suites, validation reports,
//! and comparison reports consumed by CI gates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SUITE_SCHEMA_V1: &str = "crossval.suite.v1";
pub const VALIDATION_SCHEMA_V1: &str = "crossval.validation.v1";
pub const COMPARISON_SCHEMA_V1: &str = "crossval.comparison.v1";

/// Absolute-difference tolerance applied when a case declares none.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Decimal places attached by default to generated non-error cases.
pub const DEFAULT_PRECISION: u32 = 10;

/// A value flowing into or out of a formula implementation.
///
/// Dates are carried as ISO-8601 strings, which is also their JSON wire
/// form. `Bool` is deliberately not numeric for comparison purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Numeric view used by the comparator. Ints widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// Tagged error kinds an implementation may return.
///
/// Equality is exact kind identity: there is no subtype relation, so an
/// expectation of `OutOfRange` is never satisfied by `InvalidInput`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DivisionByZero,
    Overflow,
    InvalidInput,
    OutOfRange,
    TypeMismatch,
    Other(String),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DivisionByZero => write!(f, "division_by_zero"),
            ErrorKind::Overflow => write!(f, "overflow"),
            ErrorKind::InvalidInput => write!(f, "invalid_input"),
            ErrorKind::OutOfRange => write!(f, "out_of_range"),
            ErrorKind::TypeMismatch => write!(f, "type_mismatch"),
            ErrorKind::Other(tag) => write!(f, "other({tag})"),
        }
    }
}

/// One implementation call result, as persisted in comparison results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Outcome {
    Value(Value),
    Error(ErrorKind),
}

impl Outcome {
    pub fn from_result(result: Result<Value, ErrorKind>) -> Self {
        match result {
            Ok(v) => Outcome::Value(v),
            Err(e) => Outcome::Error(e),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorKind> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Error(e) => Some(e),
        }
    }
}

/// Generation strategy bucket a test case belongs to.
#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    Normal,
    Boundary,
    Edge,
    Error,
}

impl TestCategory {
    pub const ALL: [TestCategory; 4] = [
        TestCategory::Normal,
        TestCategory::Boundary,
        TestCategory::Edge,
        TestCategory::Error,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TestCategory::Normal => "normal",
            TestCategory::Boundary => "boundary",
            TestCategory::Edge => "edge",
            TestCategory::Error => "error",
        }
    }
}

/// Named-parameter bag handed to implementations.
pub type Inputs = BTreeMap<String, Value>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CaseError {
    #[error("test case name must not be empty")]
    EmptyName,

    #[error("test case '{0}' has no inputs")]
    EmptyInputs(String),

    #[error("test case '{0}' has a negative or non-finite tolerance: {1}")]
    InvalidTolerance(String, f64),

    #[error("test case '{0}' declares both an expected output and an expected exception")]
    ConflictingExpectations(String),
}

impl From<CaseError> for crossval_error::Error {
    fn from(err: CaseError) -> Self {
        crossval_error::Error::Case(err.to_string())
    }
}

/// Immutable description of one executable check.
///
/// Construct through [`TestCase::builder`]; the builder rejects malformed
/// cases at construction time (configuration errors are never coerced).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub category: TestCategory,

    /// Parameter name -> value; never empty.
    pub inputs: Inputs,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_exception: Option<ErrorKind>,

    /// Decimal places for rounding-based equality. Takes priority over
    /// tolerance when both are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    /// Absolute-difference equality bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl TestCase {
    pub fn builder(id: impl Into<String>, name: impl Into<String>, category: TestCategory) -> TestCaseBuilder {
        TestCaseBuilder {
            id: id.into(),
            name: name.into(),
            category,
            inputs: BTreeMap::new(),
            expected_output: None,
            expected_exception: None,
            precision: None,
            tolerance: None,
            description: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Re-check invariants on a deserialized case (loading persisted JSON
    /// bypasses the builder).
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.name.trim().is_empty() {
            return Err(CaseError::EmptyName);
        }
        if self.inputs.is_empty() {
            return Err(CaseError::EmptyInputs(self.name.clone()));
        }
        if let Some(t) = self.tolerance {
            if !t.is_finite() || t < 0.0 {
                return Err(CaseError::InvalidTolerance(self.name.clone(), t));
            }
        }
        if self.expected_output.is_some() && self.expected_exception.is_some() {
            return Err(CaseError::ConflictingExpectations(self.name.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TestCaseBuilder {
    id: String,
    name: String,
    category: TestCategory,
    inputs: Inputs,
    expected_output: Option<Value>,
    expected_exception: Option<ErrorKind>,
    precision: Option<u32>,
    tolerance: Option<f64>,
    description: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl TestCaseBuilder {
    pub fn input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    pub fn inputs(mut self, inputs: Inputs) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn expected_output(mut self, value: impl Into<Value>) -> Self {
        self.expected_output = Some(value.into());
        self
    }

    pub fn expected_exception(mut self, kind: ErrorKind) -> Self {
        self.expected_exception = Some(kind);
        self
    }

    pub fn precision(mut self, places: u32) -> Self {
        self.precision = Some(places);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<TestCase, CaseError> {
        let case = TestCase {
            id: self.id,
            name: self.name,
            category: self.category,
            inputs: self.inputs,
            expected_output: self.expected_output,
            expected_exception: self.expected_exception,
            precision: self.precision,
            tolerance: self.tolerance,
            description: self.description,
            metadata: self.metadata,
        };
        case.validate()?;
        Ok(case)
    }
}

/// Record of one (case, implementation) execution.
///
/// `expected_output` / `expected_exception` hold the expectation that was
/// actually used for comparison: the case's own declaration when present,
/// otherwise the reference outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestResult {
    pub case_id: String,
    pub case_name: String,
    pub category: TestCategory,
    pub implementation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_exception: Option<ErrorKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_exception: Option<ErrorKind>,

    /// Comparator verdict for this case.
    pub matched: bool,

    /// |expected - actual| when both sides were numeric, even on a match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrepancy: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Wall-clock duration of the candidate call only.
    pub execution_time_ms: f64,
}

impl TestResult {
    /// Pass/fail verdict for this result.
    ///
    /// Cases with neither an expected output nor an expected exception pass
    /// whenever the call returned without error (smoke-test semantics).
    pub fn passed(&self) -> bool {
        if let Some(expected) = &self.expected_exception {
            return self.actual_exception.as_ref() == Some(expected);
        }
        if self.expected_output.is_some() {
            return self.matched;
        }
        self.actual_exception.is_none()
    }
}

/// Statistics over the numeric discrepancies of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct DiscrepancySummary {
    /// Results for which a discrepancy was defined.
    pub numeric_tests: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,

    /// Results with discrepancy strictly greater than zero.
    pub nonzero: u32,
}

/// Aggregate of one implementation validated against one reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub id: String,
    pub implementation_name: String,
    pub reference_name: String,
    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub results: Vec<TestResult>,
    pub discrepancy_summary: DiscrepancySummary,

    /// Wall-clock span of the whole validation loop.
    pub execution_time_ms: f64,
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ValidationReport {
    /// passed / total_tests * 100; pinned to 0.0 for the empty suite.
    pub fn pass_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        f64::from(self.passed) / f64::from(self.total_tests) * 100.0
    }

    /// True when every case passed. Vacuously true for the empty suite.
    pub fn success(&self) -> bool {
        self.passed == self.total_tests
    }

    pub fn failed_tests(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| !r.passed()).collect()
    }

    /// Results sorted descending by discrepancy, truncated to `limit`.
    ///
    /// The sort is stable: ties keep original test order.
    pub fn largest_discrepancies(&self, limit: usize) -> Vec<&TestResult> {
        let mut with_discrepancy: Vec<&TestResult> = self
            .results
            .iter()
            .filter(|r| r.discrepancy.is_some())
            .collect();
        with_discrepancy.sort_by(|a, b| {
            let da = a.discrepancy.unwrap_or(0.0);
            let db = b.discrepancy.unwrap_or(0.0);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });
        with_discrepancy.truncate(limit);
        with_discrepancy
    }

    /// Versioned document for CI consumption.
    pub fn to_document(&self) -> ValidationDocument {
        let failed_tests = self
            .results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| FailedTestEntry {
                test_name: r.case_name.clone(),
                expected: r.expected_output.clone(),
                actual: r.actual_output.clone(),
                discrepancy: r.discrepancy,
                error: r
                    .error_message
                    .clone()
                    .or_else(|| r.actual_exception.as_ref().map(|e| e.to_string())),
            })
            .collect();

        ValidationDocument {
            schema: VALIDATION_SCHEMA_V1.to_string(),
            id: self.id.clone(),
            implementation_name: self.implementation_name.clone(),
            reference_name: self.reference_name.clone(),
            total_tests: self.total_tests,
            passed: self.passed,
            failed: self.failed,
            pass_rate: self.pass_rate(),
            success: self.success(),
            discrepancy_summary: self.discrepancy_summary.clone(),
            execution_time_ms: self.execution_time_ms,
            timestamp: self.timestamp.clone(),
            metadata: self.metadata.clone(),
            failed_tests,
        }
    }
}

/// Serialized validation report, schema `crossval.validation.v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationDocument {
    pub schema: String,
    pub id: String,
    pub implementation_name: String,
    pub reference_name: String,
    pub total_tests: u32,
    pub passed: u32,
    pub failed: u32,
    pub pass_rate: f64,
    pub success: bool,
    pub discrepancy_summary: DiscrepancySummary,
    pub execution_time_ms: f64,
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    pub failed_tests: Vec<FailedTestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FailedTestEntry {
    pub test_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discrepancy: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How a comparison case disagreed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Numeric spread exceeded tolerance.
    Numeric,
    /// Non-numeric outputs differed.
    NonNumeric,
    /// Some implementations raised, or kinds differed.
    Exception,
}

/// Consensus verdict for one case across N implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonResult {
    pub case_id: String,
    pub case_name: String,
    pub category: TestCategory,

    /// Implementation name -> call outcome.
    pub outcomes: BTreeMap<String, Outcome>,

    pub consistent: bool,

    /// max - min across numeric outputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discrepancy: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<MismatchKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Split of inconsistent cases plus spread statistics for the numeric ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct InconsistencySummary {
    pub numeric_mismatches: u32,
    pub non_numeric_mismatches: u32,
    pub exception_mismatches: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discrepancy: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_discrepancy: Option<f64>,
}

/// Aggregate of N>=2 implementations compared by consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonReport {
    pub id: String,
    pub implementation_names: Vec<String>,
    pub total_tests: u32,
    pub consistent: u32,
    pub inconsistent: u32,
    pub results: Vec<ComparisonResult>,
    pub inconsistency_summary: InconsistencySummary,
    pub execution_time_ms: f64,
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ComparisonReport {
    pub fn consistency_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        f64::from(self.consistent) / f64::from(self.total_tests) * 100.0
    }

    pub fn success(&self) -> bool {
        self.inconsistent == 0
    }

    pub fn inconsistent_results(&self) -> Vec<&ComparisonResult> {
        self.results.iter().filter(|r| !r.consistent).collect()
    }

    pub fn to_document(&self) -> ComparisonDocument {
        ComparisonDocument {
            schema: COMPARISON_SCHEMA_V1.to_string(),
            id: self.id.clone(),
            implementation_names: self.implementation_names.clone(),
            total_tests: self.total_tests,
            consistent: self.consistent,
            inconsistent: self.inconsistent,
            consistency_rate: self.consistency_rate(),
            success: self.success(),
            inconsistency_summary: self.inconsistency_summary.clone(),
            execution_time_ms: self.execution_time_ms,
            timestamp: self.timestamp.clone(),
            metadata: self.metadata.clone(),
            inconsistent_cases: self
                .inconsistent_results()
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}

/// Serialized comparison report, schema `crossval.comparison.v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonDocument {
    pub schema: String,
    pub id: String,
    pub implementation_names: Vec<String>,
    pub total_tests: u32,
    pub consistent: u32,
    pub inconsistent: u32,
    pub consistency_rate: f64,
    pub success: bool,
    pub inconsistency_summary: InconsistencySummary,
    pub execution_time_ms: f64,
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    pub inconsistent_cases: Vec<ComparisonResult>,
}

// ----------------------------
// Formula specification inputs
// ----------------------------

/// Declared numeric/date type of a formula parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Int,
    Float,
    Date,
}

/// One typed, optionally bounded parameter of a formula spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A named computation with typed, bounded parameters, extracted externally
/// from a document's semantic representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormulaSpec {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub parameters: Vec<ParameterSpec>,

    /// Dependency tags, e.g. "calendar" for date-sensitive formulas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl FormulaSpec {
    pub fn has_dependency(&self, tag: &str) -> bool {
        self.dependencies.iter().any(|d| d == tag)
    }
}

/// All formulas extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSpec {
    pub document_id: String,
    pub formulas: Vec<FormulaSpec>,
}

/// Persisted generation output, schema `crossval.suite.v1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestSuiteDoc {
    pub schema: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    pub formula_id: String,
    pub test_cases: Vec<TestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoke_result(actual_exception: Option<ErrorKind>) -> TestResult {
        TestResult {
            case_id: "c1".to_string(),
            case_name: "smoke".to_string(),
            category: TestCategory::Normal,
            implementation: "candidate".to_string(),
            expected_output: None,
            expected_exception: None,
            actual_output: Some(Value::Float(42.0)),
            actual_exception,
            matched: false,
            discrepancy: None,
            error_message: None,
            execution_time_ms: 0.1,
        }
    }

    #[test]
    fn builder_rejects_empty_name() {
        let err = TestCase::builder("id", "", TestCategory::Normal)
            .input("x", 1.0)
            .build()
            .unwrap_err();
        assert_eq!(err, CaseError::EmptyName);
    }

    #[test]
    fn builder_rejects_empty_inputs() {
        let err = TestCase::builder("id", "no inputs", TestCategory::Normal)
            .build()
            .unwrap_err();
        assert!(matches!(err, CaseError::EmptyInputs(_)));
    }

    #[test]
    fn builder_rejects_negative_tolerance() {
        let err = TestCase::builder("id", "bad tol", TestCategory::Normal)
            .input("x", 1.0)
            .tolerance(-0.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, CaseError::InvalidTolerance(_, _)));
    }

    #[test]
    fn builder_rejects_conflicting_expectations() {
        let err = TestCase::builder("id", "conflict", TestCategory::Error)
            .input("x", 1.0)
            .expected_output(2.0)
            .expected_exception(ErrorKind::OutOfRange)
            .build()
            .unwrap_err();
        assert!(matches!(err, CaseError::ConflictingExpectations(_)));
    }

    #[test]
    fn passed_expected_exception_requires_exact_kind() {
        let mut r = smoke_result(Some(ErrorKind::DivisionByZero));
        r.expected_exception = Some(ErrorKind::DivisionByZero);
        r.actual_output = None;
        assert!(r.passed());

        r.actual_exception = Some(ErrorKind::InvalidInput);
        assert!(!r.passed());

        r.actual_exception = None;
        assert!(!r.passed());
    }

    // The permissive behavior is deliberate: cases with no expectation at
    // all act as smoke tests and pass whenever the call did not error,
    // regardless of the comparator's `matched` verdict.
    #[test]
    fn passed_smoke_case_ignores_match() {
        let r = smoke_result(None);
        assert!(!r.matched);
        assert!(r.passed());

        let r = smoke_result(Some(ErrorKind::Overflow));
        assert!(!r.passed());
    }

    #[test]
    fn pass_rate_empty_report_is_zero() {
        let report = ValidationReport {
            id: "r1".to_string(),
            implementation_name: "candidate".to_string(),
            reference_name: "reference".to_string(),
            total_tests: 0,
            passed: 0,
            failed: 0,
            results: vec![],
            discrepancy_summary: DiscrepancySummary::default(),
            execution_time_ms: 0.0,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            metadata: BTreeMap::new(),
        };
        assert_eq!(report.pass_rate(), 0.0);
        // 0 == 0: vacuously successful.
        assert!(report.success());
    }

    #[test]
    fn largest_discrepancies_is_stable_on_ties() {
        let mut results = Vec::new();
        for (i, d) in [(0, 1.0), (1, 5.0), (2, 5.0), (3, 0.5)] {
            let mut r = smoke_result(None);
            r.case_id = format!("c{i}");
            r.discrepancy = Some(d);
            results.push(r);
        }
        let report = ValidationReport {
            id: "r1".to_string(),
            implementation_name: "candidate".to_string(),
            reference_name: "reference".to_string(),
            total_tests: 4,
            passed: 4,
            failed: 0,
            results,
            discrepancy_summary: DiscrepancySummary::default(),
            execution_time_ms: 1.0,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            metadata: BTreeMap::new(),
        };

        let top = report.largest_discrepancies(3);
        let ids: Vec<&str> = top.iter().map(|r| r.case_id.as_str()).collect();
        // The two 5.0 ties keep original order (c1 before c2).
        assert_eq!(ids, vec!["c1", "c2", "c0"]);
    }

    #[test]
    fn value_untagged_serde_round_trip() {
        let v = Value::List(vec![
            Value::Int(3),
            Value::Float(2.5),
            Value::Str("2024-02-29".to_string()),
            Value::Bool(true),
        ]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"[3,2.5,"2024-02-29",true]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn category_serde_keys_are_snake_case() {
        let json = serde_json::to_string(&TestCategory::Boundary).unwrap();
        assert_eq!(json, "\"boundary\"");
    }

    #[test]
    fn validation_document_carries_schema_and_derived_fields() {
        let mut r = smoke_result(Some(ErrorKind::Overflow));
        r.expected_output = Some(Value::Float(1.0));
        r.actual_output = None;
        r.error_message = Some("unexpected error: overflow".to_string());

        let report = ValidationReport {
            id: "r1".to_string(),
            implementation_name: "candidate".to_string(),
            reference_name: "reference".to_string(),
            total_tests: 1,
            passed: 0,
            failed: 1,
            results: vec![r],
            discrepancy_summary: DiscrepancySummary::default(),
            execution_time_ms: 3.5,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            metadata: BTreeMap::new(),
        };

        let doc = report.to_document();
        assert_eq!(doc.schema, VALIDATION_SCHEMA_V1);
        assert_eq!(doc.pass_rate, 0.0);
        assert!(!doc.success);
        assert_eq!(doc.failed_tests.len(), 1);
        assert_eq!(doc.failed_tests[0].test_name, "smoke");
        assert_eq!(
            doc.failed_tests[0].error.as_deref(),
            Some("unexpected error: overflow")
        );
    }
}
