use super::{FieldSpec, FieldType, ModelDescriptor, ModelRegistry, ModelShape, Validator};
use crate::domain::outcome::{ValidationIssue, ValidationOutcome};
use crate::error::Result;
use serde_json::Value as JsonValue;

const INCIDENT_STATUSES: &[&str] = &["open", "acknowledged", "resolved"];

/// Validator for the `incident` model.
pub struct IncidentValidator;

impl IncidentValidator {
    pub fn shape() -> ModelShape {
        ModelShape::new(vec![
            FieldSpec::new("id", FieldType::String),
            FieldSpec::new("title", FieldType::String),
            FieldSpec::new("severity", FieldType::Integer),
            FieldSpec::new("status", FieldType::String),
            FieldSpec::new("tags", FieldType::Array),
            FieldSpec::new("description", FieldType::String).nullable(),
        ])
    }

    pub fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("incident", IncidentValidator)
            .with_display_name("Incident")
            .with_description("Incident notifications from alerting systems")
            .with_shape(Self::shape())
    }
}

impl Validator for IncidentValidator {
    fn validate(&self, payload: &JsonValue) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();

        let title = payload.get("title").and_then(|v| v.as_str()).unwrap_or("");
        if title.trim().is_empty() {
            outcome.push_error(ValidationIssue::on_field(
                "title",
                "MISSING_TITLE",
                "Incident must have a non-empty title",
            ));
        }

        let severity = payload.get("severity").and_then(|v| v.as_i64()).unwrap_or(0);
        if !(1..=5).contains(&severity) {
            outcome.push_error(ValidationIssue::on_field(
                "severity",
                "INVALID_SEVERITY",
                format!("Severity must be between 1 and 5, got {}", severity),
            ));
        }

        let status = payload.get("status").and_then(|v| v.as_str()).unwrap_or("");
        if !INCIDENT_STATUSES.contains(&status) {
            outcome.push_error(ValidationIssue::on_field(
                "status",
                "INVALID_STATUS",
                format!("Unknown incident status '{}'", status),
            ));
        }

        let no_tags = payload
            .get("tags")
            .and_then(|v| v.as_array())
            .map_or(true, |t| t.is_empty());
        if no_tags {
            outcome.push_warning(ValidationIssue::on_field(
                "tags",
                "MISSING_TAGS",
                "Incident has no tags; routing falls back to defaults",
            ));
        }

        outcome
    }
}

/// Validator for `github` webhook deliveries (dynamic shape).
pub struct GithubWebhookValidator;

impl GithubWebhookValidator {
    pub fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("github", GithubWebhookValidator)
            .with_display_name("GitHub")
            .with_description("GitHub webhook deliveries")
    }
}

impl Validator for GithubWebhookValidator {
    fn validate(&self, payload: &JsonValue) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::valid();

        if payload.get("action").and_then(|v| v.as_str()).is_none() {
            outcome.push_error(ValidationIssue::on_field(
                "action",
                "MISSING_ACTION",
                "Webhook must have an action field",
            ));
        }

        match payload.get("repository") {
            Some(repo) if repo.is_object() => {
                if repo.get("full_name").and_then(|v| v.as_str()).is_none() {
                    outcome.push_error(ValidationIssue::on_field(
                        "repository.full_name",
                        "MISSING_REPOSITORY_NAME",
                        "Repository must have a full_name",
                    ));
                }
            }
            Some(_) => outcome.push_error(ValidationIssue::on_field(
                "repository",
                "TYPE_MISMATCH",
                "repository must be an object",
            )),
            None => outcome.push_error(ValidationIssue::on_field(
                "repository",
                "MISSING_REPOSITORY",
                "Webhook must have a repository field",
            )),
        }

        if payload.get("sender").is_none() {
            outcome.push_warning(ValidationIssue::on_field(
                "sender",
                "MISSING_SENDER",
                "Webhook has no sender",
            ));
        }

        outcome
    }
}

/// Registers the bundled models.
pub async fn register_examples(registry: &ModelRegistry) -> Result<()> {
    registry.register(IncidentValidator::descriptor()).await?;
    registry.register(GithubWebhookValidator::descriptor()).await?;
    Ok(())
}
