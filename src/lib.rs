pub mod domain;
pub mod error;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::model::{
    CapabilityAdapter, CheckValidator, FieldSpec, FieldType, FnValidator, MapValidator,
    ModelDescriptor, ModelRegistry, ModelShape, Validator,
};
pub use domain::outcome::{codes, ValidationIssue, ValidationOutcome};
pub use domain::session::{BatchSession, SessionManager, SessionStatus};
pub use domain::validation::{
    ArrayValidationResult, ArrayValidator, BatchStatus, RowResult, Summary,
};
pub use error::{EngineError, Result};
