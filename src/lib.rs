//! Crossval workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests:
//! the end-to-end scenarios and cross-crate properties in `tests/`.
//! All functionality lives in the `crates/` members.
