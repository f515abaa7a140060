//! The validation engine: model registry, array validation and batch sessions.

pub mod model;
pub mod outcome;
pub mod session;
pub mod validation;

pub use outcome::{ValidationIssue, ValidationOutcome};
