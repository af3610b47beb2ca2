//! Test-case synthesis for crossval.
//!
//! The generator turns a formula spec (typed, optionally bounded
//! parameters) into categorized test cases: normal in-domain samples,
//! declared-bound boundary cases, domain-specific edge cases, and
//! deliberately invalid error cases. Generation is deterministic so that
//! regenerated suites diff cleanly.

mod factory;

pub use factory::TestCaseFactory;

use crossval_types::{
    CaseError, ErrorKind, FormulaSpec, Inputs, ParamType, ParameterSpec, TestCase, TestCategory,
    Value,
};
use std::collections::BTreeMap;

/// Requested case count per category.
pub type CategoryCounts = BTreeMap<TestCategory, u32>;

/// Same requested count for every category.
pub fn uniform_counts(per_category: u32) -> CategoryCounts {
    TestCategory::ALL
        .iter()
        .map(|c| (*c, per_category))
        .collect()
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GenerateError {
    #[error("formula '{formula}' declares no parameters")]
    NoParameters { formula: String },

    #[error("formula '{formula}' parameter '{parameter}' has min {min} > max {max}")]
    InvalidDomain {
        formula: String,
        parameter: String,
        min: f64,
        max: f64,
    },

    #[error(transparent)]
    Case(#[from] CaseError),
}

impl From<GenerateError> for crossval_error::Error {
    fn from(err: GenerateError) -> Self {
        crossval_error::Error::Generate(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Decimal places attached to non-error cases.
    pub default_precision: u32,

    /// Numeric domain used when a parameter declares no bounds.
    pub default_min: f64,
    pub default_max: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            default_precision: crossval_types::DEFAULT_PRECISION,
            default_min: 0.0,
            default_max: 1000.0,
        }
    }
}

/// Date pool for in-domain date parameters.
const NOMINAL_DATES: [&str; 4] = ["2024-03-15", "2024-06-10", "2024-09-05", "2024-11-20"];

/// Calendar edge cases: leap-year boundaries, month ends, weekend adjacency.
const EDGE_DATES: [(&str, &str); 8] = [
    ("2024-02-29", "leap day"),
    ("2023-02-28", "non-leap february end"),
    ("2024-02-28", "day before leap day"),
    ("2024-12-31", "year end"),
    ("2024-01-31", "31-day month end"),
    ("2024-04-30", "30-day month end"),
    ("2024-03-09", "saturday"),
    ("2024-03-11", "monday after weekend"),
];

#[derive(Debug, Clone, Default)]
pub struct TestCaseGenerator {
    config: GeneratorConfig,
}

impl TestCaseGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        TestCaseGenerator { config }
    }

    /// Generate cases for every formula of a document, keyed by formula id.
    pub fn generate_for_document(
        &self,
        document: &crossval_types::DocumentSpec,
        counts: &CategoryCounts,
    ) -> Result<BTreeMap<String, Vec<TestCase>>, GenerateError> {
        let mut suites = BTreeMap::new();
        for formula in &document.formulas {
            let cases = self.generate_for_formula(formula, counts)?;
            suites.insert(formula.id.clone(), cases);
        }
        Ok(suites)
    }

    /// Generate categorized cases for one formula.
    ///
    /// Malformed parameter domains (min > max) and parameterless formulas
    /// are configuration errors, reported rather than tolerated.
    pub fn generate_for_formula(
        &self,
        spec: &FormulaSpec,
        counts: &CategoryCounts,
    ) -> Result<Vec<TestCase>, GenerateError> {
        if spec.parameters.is_empty() {
            return Err(GenerateError::NoParameters {
                formula: spec.id.clone(),
            });
        }
        for param in &spec.parameters {
            if let (Some(min), Some(max)) = (param.min, param.max) {
                if min > max {
                    return Err(GenerateError::InvalidDomain {
                        formula: spec.id.clone(),
                        parameter: param.name.clone(),
                        min,
                        max,
                    });
                }
            }
        }

        let mut cases = Vec::new();
        for category in TestCategory::ALL {
            let requested = counts.get(&category).copied().unwrap_or(0) as usize;
            if requested == 0 {
                continue;
            }
            match category {
                TestCategory::Normal => self.normal_cases(spec, requested, &mut cases)?,
                TestCategory::Boundary => self.boundary_cases(spec, requested, &mut cases)?,
                TestCategory::Edge => self.edge_cases(spec, requested, &mut cases)?,
                TestCategory::Error => self.error_cases(spec, requested, &mut cases)?,
            }
        }
        Ok(cases)
    }

    fn normal_cases(
        &self,
        spec: &FormulaSpec,
        count: usize,
        out: &mut Vec<TestCase>,
    ) -> Result<(), GenerateError> {
        for i in 0..count {
            let mut inputs = Inputs::new();
            for param in &spec.parameters {
                // Evenly spaced strictly inside the domain.
                let fraction = (i as f64 + 1.0) / (count as f64 + 1.0);
                inputs.insert(param.name.clone(), self.in_domain_value(param, fraction, i));
            }
            out.push(self.case(spec, TestCategory::Normal, i, inputs, None, None)?);
        }
        Ok(())
    }

    /// Boundary assignments come from *declared* bounds only; a formula
    /// with no declared bounds legitimately yields no boundary cases.
    fn boundary_cases(
        &self,
        spec: &FormulaSpec,
        count: usize,
        out: &mut Vec<TestCase>,
    ) -> Result<(), GenerateError> {
        #[derive(Clone)]
        struct Pin {
            parameter: String,
            value: f64,
            label: &'static str,
        }

        let mut pins: Vec<Pin> = Vec::new();
        for param in &spec.parameters {
            if param.param_type == ParamType::Date {
                continue;
            }
            if let Some(min) = param.min {
                pins.push(Pin {
                    parameter: param.name.clone(),
                    value: min,
                    label: "min",
                });
                // Literal zero whenever the domain admits it.
                if min <= 0.0 && param.max.map(|max| max >= 0.0).unwrap_or(true) && min != 0.0 {
                    pins.push(Pin {
                        parameter: param.name.clone(),
                        value: 0.0,
                        label: "zero",
                    });
                }
            }
            if let Some(max) = param.max {
                pins.push(Pin {
                    parameter: param.name.clone(),
                    value: max,
                    label: "max",
                });
            }
        }

        if pins.is_empty() {
            return Ok(());
        }

        for i in 0..count {
            let pin = &pins[i % pins.len()];
            let mut inputs = Inputs::new();
            for param in &spec.parameters {
                let value = if param.name == pin.parameter {
                    numeric_value(param, pin.value)
                } else {
                    self.in_domain_value(param, 0.5, i)
                };
                inputs.insert(param.name.clone(), value);
            }
            let description = format!("{} pinned to {}", pin.parameter, pin.label);
            out.push(self.case(
                spec,
                TestCategory::Boundary,
                i,
                inputs,
                None,
                Some(description),
            )?);
        }
        Ok(())
    }

    fn edge_cases(
        &self,
        spec: &FormulaSpec,
        count: usize,
        out: &mut Vec<TestCase>,
    ) -> Result<(), GenerateError> {
        let calendar = spec.has_dependency("calendar")
            && spec
                .parameters
                .iter()
                .any(|p| p.param_type == ParamType::Date);

        for i in 0..count {
            let mut inputs = Inputs::new();
            let mut description = None;
            for param in &spec.parameters {
                let value = match (calendar, param.param_type) {
                    (true, ParamType::Date) => {
                        let (date, label) = EDGE_DATES[i % EDGE_DATES.len()];
                        description = Some(label.to_string());
                        Value::Str(date.to_string())
                    }
                    (_, ParamType::Date) => {
                        Value::Str(NOMINAL_DATES[i % NOMINAL_DATES.len()].to_string())
                    }
                    _ => self.precision_limit_value(param, i),
                };
                inputs.insert(param.name.clone(), value);
            }
            out.push(self.case(spec, TestCategory::Edge, i, inputs, None, description)?);
        }
        Ok(())
    }

    /// Deliberately invalid inputs, paired with the error kind a conforming
    /// implementation must raise, never with an expected output.
    fn error_cases(
        &self,
        spec: &FormulaSpec,
        count: usize,
        out: &mut Vec<TestCase>,
    ) -> Result<(), GenerateError> {
        struct Poison {
            parameter: String,
            value: Value,
            kind: ErrorKind,
            label: String,
        }

        let mut poisons: Vec<Poison> = Vec::new();
        for param in &spec.parameters {
            if param.param_type == ParamType::Date {
                poisons.push(Poison {
                    parameter: param.name.clone(),
                    value: Value::Str("not-a-date".to_string()),
                    kind: ErrorKind::InvalidInput,
                    label: format!("{} malformed date", param.name),
                });
                continue;
            }
            // Out-of-range poisons only for declared bounds: an
            // implementation cannot be expected to reject values outside
            // a domain the spec never stated.
            let (lo, hi) = self.domain(param);
            let span = (hi - lo).abs().max(1.0);
            if let Some(max) = param.max {
                poisons.push(Poison {
                    parameter: param.name.clone(),
                    value: numeric_value(param, max + span),
                    kind: ErrorKind::OutOfRange,
                    label: format!("{} above max", param.name),
                });
            }
            if let Some(min) = param.min {
                poisons.push(Poison {
                    parameter: param.name.clone(),
                    value: numeric_value(param, min - span),
                    kind: ErrorKind::OutOfRange,
                    label: format!("{} below min", param.name),
                });
            }
            poisons.push(Poison {
                parameter: param.name.clone(),
                value: Value::Str("not-a-number".to_string()),
                kind: ErrorKind::TypeMismatch,
                label: format!("{} wrong type", param.name),
            });
        }

        for i in 0..count {
            let poison = &poisons[i % poisons.len()];
            let mut inputs = Inputs::new();
            for param in &spec.parameters {
                let value = if param.name == poison.parameter {
                    poison.value.clone()
                } else {
                    self.in_domain_value(param, 0.5, i)
                };
                inputs.insert(param.name.clone(), value);
            }
            let case = TestCase::builder(
                uuid::Uuid::new_v4().to_string(),
                format!("{} {} {}", display_name(spec), TestCategory::Error.label(), i + 1),
                TestCategory::Error,
            )
            .inputs(inputs)
            .expected_exception(poison.kind.clone())
            .description(poison.label.clone())
            .metadata("formula", spec.id.clone())
            .metadata("category", TestCategory::Error.label())
            .build()?;
            out.push(case);
        }
        Ok(())
    }

    fn case(
        &self,
        spec: &FormulaSpec,
        category: TestCategory,
        index: usize,
        inputs: Inputs,
        expected_output: Option<Value>,
        description: Option<String>,
    ) -> Result<TestCase, GenerateError> {
        let mut builder = TestCase::builder(
            uuid::Uuid::new_v4().to_string(),
            format!("{} {} {}", display_name(spec), category.label(), index + 1),
            category,
        )
        .inputs(inputs)
        .precision(self.config.default_precision)
        .metadata("formula", spec.id.clone())
        .metadata("category", category.label());

        if let Some(expected) = expected_output {
            builder = builder.expected_output(expected);
        }
        if let Some(text) = description {
            builder = builder.description(text);
        }
        Ok(builder.build()?)
    }

    fn domain(&self, param: &ParameterSpec) -> (f64, f64) {
        (
            param.min.unwrap_or(self.config.default_min),
            param.max.unwrap_or(self.config.default_max),
        )
    }

    fn in_domain_value(&self, param: &ParameterSpec, fraction: f64, index: usize) -> Value {
        match param.param_type {
            ParamType::Date => Value::Str(NOMINAL_DATES[index % NOMINAL_DATES.len()].to_string()),
            _ => {
                let (lo, hi) = self.domain(param);
                numeric_value(param, lo + fraction * (hi - lo))
            }
        }
    }

    /// Values at the representation's precision limits, kept in-domain.
    fn precision_limit_value(&self, param: &ParameterSpec, index: usize) -> Value {
        let (lo, hi) = self.domain(param);
        let span = hi - lo;
        let candidates = [
            lo + span * 1e-12,
            hi - span * 1e-12,
            lo + span * 0.123_456_789_012_345,
            lo + span * (1.0 / 3.0),
        ];
        numeric_value(param, candidates[index % candidates.len()])
    }
}

fn numeric_value(param: &ParameterSpec, value: f64) -> Value {
    match param.param_type {
        ParamType::Int => Value::Int(value.round() as i64),
        _ => Value::Float(value),
    }
}

fn display_name(spec: &FormulaSpec) -> &str {
    spec.name.as_deref().unwrap_or(&spec.id)
}
