//! Cross-validation framework for formula implementations.
//!
//! Generate categorized test suites from formula specs, execute candidate
//! implementations against a reference (or several against each other),
//! and gate CI on the aggregated verdict.
//!
//! ```
//! use crossval::{CrossValidator, ErrorKind, Inputs, TestCaseFactory, ValidationRun, Value};
//! use std::collections::BTreeMap;
//!
//! fn simple_interest(inputs: &Inputs) -> Result<Value, ErrorKind> {
//!     let get = |key: &str| {
//!         inputs.get(key).and_then(Value::as_f64).ok_or(ErrorKind::InvalidInput)
//!     };
//!     if get("principal")? < 0.0 {
//!         return Err(ErrorKind::OutOfRange);
//!     }
//!     Ok(Value::Float(get("principal")? * get("rate")? * get("term")?))
//! }
//!
//! let cases = TestCaseFactory::simple_interest_suite()?;
//! let report = CrossValidator::new().validate_implementation(&ValidationRun {
//!     reference_name: "reference".to_string(),
//!     reference: &simple_interest,
//!     candidate_name: "candidate".to_string(),
//!     candidate: &simple_interest,
//!     cases: &cases,
//!     metadata: BTreeMap::new(),
//! });
//! assert!(report.success());
//! # Ok::<(), crossval::CaseError>(())
//! ```

pub use crossval_app::{
    render_comparison_document, render_comparison_markdown, render_markdown,
    render_validation_document, Clock, ComparisonRun, CrossValidator, SystemClock, ValidationRun,
    ValidatorError,
};
pub use crossval_domain::{
    check_consistency, compare_outputs, summarize_discrepancies, summarize_inconsistencies,
    ComparePolicy, CompareOutcome, ConsistencyOutcome, Formula,
};
pub use crossval_error::Error;
pub use crossval_generate::{
    uniform_counts, CategoryCounts, GenerateError, GeneratorConfig, TestCaseFactory,
    TestCaseGenerator,
};
pub use crossval_types::{
    CaseError, ComparisonDocument, ComparisonReport, ComparisonResult, DiscrepancySummary,
    DocumentSpec, ErrorKind, FailedTestEntry, FormulaSpec, InconsistencySummary, Inputs,
    MismatchKind, Outcome, ParamType, ParameterSpec, TestCase, TestCaseBuilder, TestCategory,
    TestResult, TestSuiteDoc, ValidationDocument, ValidationReport, Value, COMPARISON_SCHEMA_V1,
    DEFAULT_PRECISION, DEFAULT_TOLERANCE, SUITE_SCHEMA_V1, VALIDATION_SCHEMA_V1,
};
