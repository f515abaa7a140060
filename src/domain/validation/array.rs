//! Validates arrays of records against a registered model.

use super::{
    decide_status, detect_record_id, test_label, ArrayValidationResult, RowResult, Summary,
};
use crate::domain::model::{CapabilityAdapter, ModelDescriptor, ModelRegistry, ShapeError};
use crate::domain::outcome::{codes, ValidationIssue};
use crate::domain::session::SessionManager;
use crate::error::Result;
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Instant;

/// Generates a batch id for calls that do not bring their own.
pub fn new_batch_id() -> String {
    format!(
        "batch_{}_{:08x}",
        Utc::now().format("%Y%m%d%H%M%S"),
        rand::random::<u32>()
    )
}

/// Rows of a payload: the elements of a JSON array, or the payload itself.
pub fn records_of(payload: &JsonValue) -> &[JsonValue] {
    match payload {
        JsonValue::Array(items) => items,
        single => std::slice::from_ref(single),
    }
}

pub struct ArrayValidator {
    registry: Arc<ModelRegistry>,
}

impl ArrayValidator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Validates every record in index order.
    ///
    /// An unknown model fails the whole call; anything wrong with an individual
    /// row only degrades that row.
    pub async fn validate_array(
        &self,
        model_id: &str,
        records: &[JsonValue],
        threshold: Option<f64>,
    ) -> Result<ArrayValidationResult> {
        self.validate_batch(new_batch_id(), model_id, records, threshold)
            .await
    }

    /// Like [`validate_array`](Self::validate_array) but with a caller-chosen batch id.
    pub async fn validate_batch(
        &self,
        batch_id: String,
        model_id: &str,
        records: &[JsonValue],
        threshold: Option<f64>,
    ) -> Result<ArrayValidationResult> {
        let descriptor = self.registry.get(model_id).await?;
        Ok(run(&descriptor, batch_id, records, threshold))
    }

    /// A JSON array is validated row by row; any other payload is a one-row batch.
    pub async fn validate_payload(
        &self,
        model_id: &str,
        payload: &JsonValue,
        threshold: Option<f64>,
    ) -> Result<ArrayValidationResult> {
        self.validate_array(model_id, records_of(payload), threshold)
            .await
    }

    /// Validates `records` and adds the resulting counts to session `batch_id`,
    /// creating the session with `threshold` when it does not exist yet.
    ///
    /// The array verdict uses the session's threshold.
    pub async fn validate_into_session(
        &self,
        sessions: &SessionManager,
        batch_id: &str,
        model_id: &str,
        records: &[JsonValue],
        threshold: Option<f64>,
    ) -> Result<ArrayValidationResult> {
        let descriptor = self.registry.get(model_id).await?;
        let session = sessions.get_or_create_session(batch_id, threshold).await;
        let result = run(&descriptor, batch_id.to_string(), records, session.threshold);
        sessions
            .update_session(
                batch_id,
                result.valid_records as u64,
                result.invalid_records as u64,
                result.warning_records as u64,
            )
            .await?;
        Ok(result)
    }
}

fn run(
    descriptor: &ModelDescriptor,
    batch_id: String,
    records: &[JsonValue],
    threshold: Option<f64>,
) -> ArrayValidationResult {
    let started = Instant::now();

    let rows: Vec<RowResult> = records
        .iter()
        .enumerate()
        .map(|(i, record)| validate_row(descriptor, i, record))
        .collect();

    let valid = rows.iter().filter(|r| r.is_valid).count();
    let invalid = rows.len() - valid;
    let with_warnings = rows.iter().filter(|r| !r.warnings.is_empty()).count();
    let summary = Summary::from_rows(&rows);
    let status = decide_status(valid as u64, invalid as u64, threshold);
    let failing: Vec<RowResult> = rows.into_iter().filter(|r| !r.is_valid).collect();

    tracing::info!(
        batch_id = %batch_id,
        model = %descriptor.id,
        total = records.len(),
        valid,
        invalid,
        status = %status,
        "array validation completed"
    );

    ArrayValidationResult {
        batch_id,
        model_id: descriptor.id.clone(),
        status,
        total_records: records.len(),
        valid_records: valid,
        invalid_records: invalid,
        warning_records: with_warnings,
        threshold,
        processing_time_ms: started.elapsed().as_millis() as u64,
        completed_at: Utc::now(),
        summary,
        results: failing,
    }
}

fn validate_row(descriptor: &ModelDescriptor, index: usize, record: &JsonValue) -> RowResult {
    let started = Instant::now();
    let record_id = detect_record_id(record, index);

    let (is_valid, errors, warnings) = match descriptor.shape.conform(record) {
        Ok(instance) => {
            let outcome = CapabilityAdapter::invoke(descriptor, &instance);
            let is_valid = outcome.is_valid();
            let (errors, warnings) = outcome.into_issues();
            (is_valid, errors, warnings)
        }
        Err(err) => (false, vec![shape_issue(&err)], Vec::new()),
    };

    RowResult {
        row_index: index,
        test_name: test_label(&descriptor.id, is_valid, &errors, &warnings),
        record_id,
        is_valid,
        errors,
        warnings,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }
}

fn shape_issue(err: &ShapeError) -> ValidationIssue {
    let message = format!("Failed to read record: {}", err);
    match err {
        ShapeError::NotAnObject(_) => ValidationIssue::new(codes::JSON_MARSHAL_ERROR, message),
        ShapeError::FieldType { field, .. } | ShapeError::NullField(field) => {
            ValidationIssue::on_field(field.clone(), codes::JSON_UNMARSHAL_ERROR, message)
        }
    }
}
