//! Hand-curated suites for the built-in interest formulas.
//!
//! Where the generator synthesizes inputs from a spec, the factory pins
//! known input/output pairs so validation runs have cases with exact
//! expected values to gate on.

use crossval_types::{CaseError, ErrorKind, TestCase, TestCategory};

pub struct TestCaseFactory;

impl TestCaseFactory {
    /// Cases for `interest = principal * rate * term`.
    ///
    /// The expected outputs are exactly representable in f64, so they hold
    /// under bit-exact comparison as well as under precision or tolerance.
    pub fn simple_interest_suite() -> Result<Vec<TestCase>, CaseError> {
        Ok(vec![
            TestCase::builder("si-normal-1", "simple interest nominal", TestCategory::Normal)
                .input("principal", 1000.0)
                .input("rate", 0.05)
                .input("term", 2i64)
                .expected_output(100.0)
                .precision(crossval_types::DEFAULT_PRECISION)
                .description("1000 at 5% over 2 periods")
                .build()?,
            TestCase::builder("si-normal-2", "simple interest tolerant", TestCategory::Normal)
                .input("principal", 1000.0)
                .input("rate", 0.05)
                .input("term", 2i64)
                .expected_output(100.0)
                .tolerance(1e-9)
                .build()?,
            TestCase::builder(
                "si-boundary-zero-principal",
                "simple interest zero principal",
                TestCategory::Boundary,
            )
            .input("principal", 0.0)
            .input("rate", 0.05)
            .input("term", 2i64)
            .expected_output(0.0)
            .precision(crossval_types::DEFAULT_PRECISION)
            .build()?,
            TestCase::builder(
                "si-boundary-zero-term",
                "simple interest zero term",
                TestCategory::Boundary,
            )
            .input("principal", 1000.0)
            .input("rate", 0.05)
            .input("term", 0i64)
            .expected_output(0.0)
            .precision(crossval_types::DEFAULT_PRECISION)
            .build()?,
            TestCase::builder(
                "si-error-negative-principal",
                "simple interest negative principal",
                TestCategory::Error,
            )
            .input("principal", -1000.0)
            .input("rate", 0.05)
            .input("term", 2i64)
            .expected_exception(ErrorKind::OutOfRange)
            .build()?,
        ])
    }

    /// Cases for `amount = principal * (1 + rate / periods) ^ (periods * term)`.
    ///
    /// Inputs are chosen so the amounts are powers of two times the
    /// principal, keeping the expectations exact.
    pub fn compound_interest_suite() -> Result<Vec<TestCase>, CaseError> {
        Ok(vec![
            TestCase::builder(
                "ci-normal-1",
                "compound interest annual doubling",
                TestCategory::Normal,
            )
            .input("principal", 1000.0)
            .input("rate", 1.0)
            .input("periods", 1i64)
            .input("term", 2i64)
            .expected_output(4000.0)
            .precision(crossval_types::DEFAULT_PRECISION)
            .description("100% annually for 2 years quadruples the principal")
            .build()?,
            TestCase::builder(
                "ci-normal-2",
                "compound interest semiannual",
                TestCategory::Normal,
            )
            .input("principal", 1024.0)
            .input("rate", 1.0)
            .input("periods", 2i64)
            .input("term", 1i64)
            .expected_output(2304.0)
            .precision(crossval_types::DEFAULT_PRECISION)
            .description("1024 * 1.5^2")
            .build()?,
            TestCase::builder(
                "ci-boundary-zero-rate",
                "compound interest zero rate",
                TestCategory::Boundary,
            )
            .input("principal", 1000.0)
            .input("rate", 0.0)
            .input("periods", 12i64)
            .input("term", 5i64)
            .expected_output(1000.0)
            .precision(crossval_types::DEFAULT_PRECISION)
            .build()?,
            TestCase::builder(
                "ci-error-zero-periods",
                "compound interest zero periods",
                TestCategory::Error,
            )
            .input("principal", 1000.0)
            .input("rate", 0.05)
            .input("periods", 0i64)
            .input("term", 2i64)
            .expected_exception(ErrorKind::DivisionByZero)
            .build()?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_interest_suite_is_well_formed() {
        let suite = TestCaseFactory::simple_interest_suite().unwrap();
        assert_eq!(suite.len(), 5);

        let nominal = &suite[0];
        assert_eq!(nominal.expected_output.as_ref().unwrap().as_f64(), Some(100.0));
        assert!(suite
            .iter()
            .any(|c| c.category == TestCategory::Error && c.expected_exception.is_some()));
    }

    #[test]
    fn compound_interest_expectations_are_exact() {
        let suite = TestCaseFactory::compound_interest_suite().unwrap();
        let doubling = suite.iter().find(|c| c.id == "ci-normal-1").unwrap();
        // 1000 * (1 + 1/1)^(1*2) = 4000, exactly representable.
        assert_eq!(doubling.expected_output.as_ref().unwrap().as_f64(), Some(4000.0));
    }
}
