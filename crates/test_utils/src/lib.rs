//! Test Utilities Crate
//!
//! Provides shared test infrastructure for the vehicle ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: deterministic record and identity test data
//! - `builders`: builder patterns for field-map construction
//! - `ledger`: the instrumented in-memory ledger double and fake identity
//!   store

pub mod builders;
pub mod fixtures;
pub mod ledger;

pub use builders::*;
pub use fixtures::*;
pub use ledger::*;
