//! Unified error type for crossval.
//!
//! Each crate defines its own narrow error enum; this crate provides the
//! umbrella type callers can hold when they drive the whole pipeline.
//! Errors from the system under test are *not* represented here; those are
//! data (`ErrorKind` outcomes), not framework failures.

/// A configuration or invariant violation inside the framework itself.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A test case failed construction-time validation.
    #[error("invalid test case: {0}")]
    Case(String),

    /// A formula spec handed to the generator is malformed.
    #[error("invalid formula spec: {0}")]
    Generate(String),

    /// A validator call was misconfigured.
    #[error("invalid validation request: {0}")]
    Validator(String),
}
