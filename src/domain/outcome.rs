//! Common shape of a single validation verdict.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Machine codes for issues the engine itself produces.
pub mod codes {
    pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
    pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
    pub const JSON_MARSHAL_ERROR: &str = "JSON_MARSHAL_ERROR";
    pub const JSON_UNMARSHAL_ERROR: &str = "JSON_UNMARSHAL_ERROR";
    /// Used when a validator reports failure without naming a reason.
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    /// Used for bare-string issues coming from map-style validators.
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
}

/// Provenance tag stamped on outcomes that the registry normalized.
pub const REGISTRY_PROVIDER: &str = "registry";

/// One error or warning attached to an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: None,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn on_field(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Accepts either a bare message string or an `{field, code, message}` object.
    fn from_value(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => ValidationIssue::new(codes::VALIDATION_ERROR, s.clone()),
            JsonValue::Object(map) => {
                let text = |key: &str| map.get(key).and_then(|v| v.as_str()).map(str::to_string);
                ValidationIssue {
                    field: text("field"),
                    code: text("code").unwrap_or_else(|| codes::VALIDATION_ERROR.to_string()),
                    message: text("message").unwrap_or_default(),
                }
            }
            other => ValidationIssue::new(codes::VALIDATION_ERROR, other.to_string()),
        }
    }
}

/// Result of validating one record.
///
/// `is_valid` is always derived from `errors`; warnings never flip validity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    is_valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    processing_time_ms: u64,
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            model_id: None,
            provider: None,
            processing_time_ms: 0,
        }
    }

    pub fn from_issues(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            ..Self::valid()
        }
    }

    /// Synthetic failing outcome for a descriptor without a validation capability.
    pub fn method_not_found(model_id: &str) -> Self {
        Self::from_issues(
            vec![ValidationIssue::new(
                codes::METHOD_NOT_FOUND,
                format!("no validation capability registered for model '{}'", model_id),
            )],
            Vec::new(),
        )
        .with_model_id(model_id)
        .with_provider(REGISTRY_PROVIDER)
    }

    /// Normalizes a keyed map (`{is_valid, errors, warnings, model_id, provider}`)
    /// into an outcome.
    ///
    /// A map that claims failure without listing errors gets a `VALIDATION_FAILED`
    /// error so the failure is not lost. Anything other than an object is a
    /// `TYPE_MISMATCH`.
    pub fn from_value(value: &JsonValue) -> Self {
        let Some(map) = value.as_object() else {
            return Self::from_issues(
                vec![ValidationIssue::new(
                    codes::TYPE_MISMATCH,
                    format!("validator returned a non-object outcome: {}", value),
                )],
                Vec::new(),
            );
        };

        let issues = |key: &str| -> Vec<ValidationIssue> {
            map.get(key)
                .and_then(|v| v.as_array())
                .map(|items| items.iter().map(ValidationIssue::from_value).collect())
                .unwrap_or_default()
        };

        let mut errors = issues("errors");
        let warnings = issues("warnings");
        let claimed_valid = map.get("is_valid").and_then(|v| v.as_bool());
        if claimed_valid == Some(false) && errors.is_empty() {
            errors.push(ValidationIssue::new(
                codes::VALIDATION_FAILED,
                "validator reported failure without details",
            ));
        }

        let mut outcome = Self::from_issues(errors, warnings);
        outcome.model_id = map
            .get("model_id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        outcome.provider = map
            .get("provider")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        outcome
    }

    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.push_error(issue);
        self
    }

    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
        self.is_valid = false;
    }

    pub fn push_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    pub(crate) fn set_processing_time_ms(&mut self, ms: u64) {
        self.processing_time_ms = ms;
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }

    pub fn into_issues(self) -> (Vec<ValidationIssue>, Vec<ValidationIssue>) {
        (self.errors, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn warnings_do_not_flip_validity() {
        let outcome = ValidationOutcome::valid()
            .with_warning(ValidationIssue::new("DEPRECATED_FIELD", "old field"));
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 1);
    }

    #[test]
    fn map_outcome_is_normalized() {
        let outcome = ValidationOutcome::from_value(&json!({
            "is_valid": true,
            "errors": ["title is required", {"field": "severity", "code": "BAD_ENUM", "message": "unknown"}],
            "warnings": [],
            "model_id": "incident",
            "provider": "legacy"
        }));
        // errors win over the claimed flag
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].code, codes::VALIDATION_ERROR);
        assert_eq!(outcome.errors()[1].field.as_deref(), Some("severity"));
        assert_eq!(outcome.model_id(), Some("incident"));
        assert_eq!(outcome.provider(), Some("legacy"));
    }

    #[test]
    fn claimed_failure_without_errors_keeps_a_reason() {
        let outcome = ValidationOutcome::from_value(&json!({ "is_valid": false }));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].code, codes::VALIDATION_FAILED);
        assert_eq!(outcome.model_id(), None);
    }

    #[test]
    fn non_object_outcome_is_a_type_mismatch() {
        let outcome = ValidationOutcome::from_value(&json!("ok"));
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors()[0].code, codes::TYPE_MISMATCH);
    }

    #[test]
    fn method_not_found_names_the_model() {
        let outcome = ValidationOutcome::method_not_found("github");
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].code, codes::METHOD_NOT_FOUND);
        assert!(outcome.errors()[0].message.contains("github"));
        assert_eq!(outcome.model_id(), Some("github"));
    }
}
