//! Adapters that turn the call conventions validators come in into
//! [`Validator`], and the single entry point the registry uses to run them.

use super::{ModelDescriptor, Validator};
use crate::domain::outcome::{ValidationIssue, ValidationOutcome, REGISTRY_PROVIDER};
use serde_json::Value as JsonValue;
use std::time::Instant;

/// Wraps a closure that already returns a [`ValidationOutcome`].
pub struct FnValidator<F>(pub F);

impl<F> Validator for FnValidator<F>
where
    F: Fn(&JsonValue) -> ValidationOutcome + Send + Sync,
{
    fn validate(&self, payload: &JsonValue) -> ValidationOutcome {
        (self.0)(payload)
    }
}

/// Wraps a pass/fail check (`Ok(())` or `Err(message)`), reporting failures
/// under a fixed error code.
pub struct CheckValidator<F> {
    code: String,
    check: F,
}

impl<F> CheckValidator<F>
where
    F: Fn(&JsonValue) -> Result<(), String> + Send + Sync,
{
    pub fn new(code: impl Into<String>, check: F) -> Self {
        Self {
            code: code.into(),
            check,
        }
    }
}

impl<F> Validator for CheckValidator<F>
where
    F: Fn(&JsonValue) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, payload: &JsonValue) -> ValidationOutcome {
        match (self.check)(payload) {
            Ok(()) => ValidationOutcome::valid(),
            Err(msg) => ValidationOutcome::valid().with_error(ValidationIssue::new(&self.code, msg)),
        }
    }
}

/// Wraps a validator that answers with a keyed JSON map
/// (`{is_valid, errors, warnings, model_id, provider}`).
pub struct MapValidator<F>(pub F);

impl<F> Validator for MapValidator<F>
where
    F: Fn(&JsonValue) -> JsonValue + Send + Sync,
{
    fn validate(&self, payload: &JsonValue) -> ValidationOutcome {
        ValidationOutcome::from_value(&(self.0)(payload))
    }
}

pub struct CapabilityAdapter;

impl CapabilityAdapter {
    /// Runs the descriptor's validator against `payload`.
    ///
    /// Always yields an outcome: a descriptor without a capability gets a
    /// synthetic `METHOD_NOT_FOUND` failure. Outcomes that do not name a model
    /// are stamped with the descriptor id and the registry provenance tag.
    pub fn invoke(descriptor: &ModelDescriptor, payload: &JsonValue) -> ValidationOutcome {
        let started = Instant::now();

        let mut outcome = match descriptor.validator.as_ref() {
            Some(v) => v.validate(payload),
            None => {
                tracing::warn!(model = %descriptor.id, "model has no validation capability");
                ValidationOutcome::method_not_found(&descriptor.id)
            }
        };

        if outcome.model_id().is_none() {
            outcome = outcome
                .with_model_id(descriptor.id.clone())
                .with_provider(REGISTRY_PROVIDER);
        }
        outcome.set_processing_time_ms(started.elapsed().as_millis() as u64);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::codes;
    use serde_json::json;

    #[test]
    fn check_validator_maps_err_to_coded_issue() {
        let d = ModelDescriptor::new(
            "incident",
            CheckValidator::new("MISSING_TITLE", |p: &JsonValue| {
                if p.get("title").is_some() {
                    Ok(())
                } else {
                    Err("title is required".to_string())
                }
            }),
        );
        let bad = CapabilityAdapter::invoke(&d, &json!({}));
        assert!(!bad.is_valid());
        assert_eq!(bad.errors()[0].code, "MISSING_TITLE");
        assert_eq!(bad.model_id(), Some("incident"));
        assert_eq!(bad.provider(), Some(REGISTRY_PROVIDER));

        assert!(CapabilityAdapter::invoke(&d, &json!({ "title": "x" })).is_valid());
    }

    #[test]
    fn outcome_naming_its_model_is_left_alone() {
        let d = ModelDescriptor::new(
            "github",
            MapValidator(|_: &JsonValue| json!({ "is_valid": true, "model_id": "gh-v2", "provider": "legacy" })),
        );
        let outcome = CapabilityAdapter::invoke(&d, &json!({}));
        assert_eq!(outcome.model_id(), Some("gh-v2"));
        assert_eq!(outcome.provider(), Some("legacy"));
    }

    #[test]
    fn missing_capability_recovers_locally() {
        let d = ModelDescriptor::without_validator("orphan");
        let outcome = CapabilityAdapter::invoke(&d, &json!({ "a": 1 }));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].code, codes::METHOD_NOT_FOUND);
        assert_eq!(outcome.model_id(), Some("orphan"));
    }
}
