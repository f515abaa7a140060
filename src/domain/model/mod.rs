//! Registered record types ("models") and the validators attached to them.

use crate::domain::outcome::ValidationOutcome;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

pub mod capability;
pub mod examples;
pub mod registry;
pub mod shape;

pub use capability::{CapabilityAdapter, CheckValidator, FnValidator, MapValidator};
pub use registry::ModelRegistry;
pub use shape::{FieldSpec, FieldType, ModelShape, ShapeError};

/// The validation capability every registered model exposes.
///
/// The registry works with any implementation without knowing the concrete
/// rules behind it: given one record, produce an outcome. Implementations must
/// not panic on unexpected payloads; report a `TYPE_MISMATCH` issue instead.
pub trait Validator: Send + Sync {
    fn validate(&self, payload: &JsonValue) -> ValidationOutcome;
}

/// One registered record type.
#[derive(Clone)]
pub struct ModelDescriptor {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
    /// `None` means the model was registered without a validation capability;
    /// validating it yields a `METHOD_NOT_FOUND` outcome.
    pub validator: Option<Arc<dyn Validator>>,
    pub shape: ModelShape,
}

impl ModelDescriptor {
    pub fn new<V: Validator + 'static>(id: impl Into<String>, validator: V) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            description: None,
            validator: Some(Arc::new(validator)),
            shape: ModelShape::dynamic(),
        }
    }

    /// Descriptor with a shape but no validation capability.
    pub fn without_validator(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            description: None,
            validator: None,
            shape: ModelShape::dynamic(),
        }
    }

    pub fn with_shape(mut self, shape: ModelShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("has_validator", &self.validator.is_some())
            .field("shape", &self.shape)
            .finish()
    }
}

impl PartialEq for ModelDescriptor {
    fn eq(&self, other: &Self) -> bool {
        let same_validator = match (&self.validator, &other.validator) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.id == other.id
            && self.display_name == other.display_name
            && self.description == other.description
            && self.shape == other.shape
            && same_validator
    }
}
