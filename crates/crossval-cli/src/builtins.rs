//! Built-in formula registry.
//!
//! Stands in for externally supplied implementations: two reference
//! formulas plus `simple_interest_recip`, which divides where it should
//! multiply, kept around to exercise the failure path end to end.

use crossval_types::{ErrorKind, Inputs, Value};

pub type BuiltinFormula = fn(&Inputs) -> Result<Value, ErrorKind>;

pub const NAMES: [&str; 3] = ["simple_interest", "compound_interest", "simple_interest_recip"];

pub fn lookup(name: &str) -> Option<BuiltinFormula> {
    match name {
        "simple_interest" => Some(simple_interest),
        "compound_interest" => Some(compound_interest),
        "simple_interest_recip" => Some(simple_interest_recip),
        _ => None,
    }
}

fn numeric(inputs: &Inputs, name: &str) -> Result<f64, ErrorKind> {
    inputs
        .get(name)
        .ok_or(ErrorKind::InvalidInput)?
        .as_f64()
        .ok_or(ErrorKind::TypeMismatch)
}

fn nonnegative(inputs: &Inputs, name: &str) -> Result<f64, ErrorKind> {
    let value = numeric(inputs, name)?;
    if value < 0.0 {
        return Err(ErrorKind::OutOfRange);
    }
    Ok(value)
}

fn finite(value: f64) -> Result<Value, ErrorKind> {
    if value.is_finite() {
        Ok(Value::Float(value))
    } else {
        Err(ErrorKind::Overflow)
    }
}

/// interest = principal * rate * term
fn simple_interest(inputs: &Inputs) -> Result<Value, ErrorKind> {
    let principal = nonnegative(inputs, "principal")?;
    let rate = nonnegative(inputs, "rate")?;
    let term = nonnegative(inputs, "term")?;
    finite(principal * rate * term)
}

/// The intentionally wrong variant: principal / rate / term.
fn simple_interest_recip(inputs: &Inputs) -> Result<Value, ErrorKind> {
    let principal = nonnegative(inputs, "principal")?;
    let rate = nonnegative(inputs, "rate")?;
    let term = nonnegative(inputs, "term")?;
    if rate == 0.0 || term == 0.0 {
        return Err(ErrorKind::DivisionByZero);
    }
    finite(principal / rate / term)
}

/// amount = principal * (1 + rate / periods) ^ (periods * term)
fn compound_interest(inputs: &Inputs) -> Result<Value, ErrorKind> {
    let principal = nonnegative(inputs, "principal")?;
    let rate = nonnegative(inputs, "rate")?;
    let periods = numeric(inputs, "periods")?;
    let term = nonnegative(inputs, "term")?;
    if periods == 0.0 {
        return Err(ErrorKind::DivisionByZero);
    }
    if periods < 0.0 {
        return Err(ErrorKind::OutOfRange);
    }
    finite(principal * (1.0 + rate / periods).powf(periods * term))
}
