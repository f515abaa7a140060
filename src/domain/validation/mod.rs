//! Per-row results, summaries and batch-level verdicts.

use crate::domain::outcome::ValidationIssue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::fmt;

pub mod array;
pub mod verdict;

pub use array::ArrayValidator;
pub use verdict::{decide_status, meets_threshold, success_rate};

/// Field names checked, in order, for a record's own identifier.
pub const IDENTIFIER_FIELDS: &[&str] = &[
    "id",
    "ID",
    "_id",
    "uuid",
    "UUID",
    "identifier",
    "recordId",
    "record_id",
];

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    Failed,
    InProgress,
}

impl BatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Success => "success",
            BatchStatus::Failed => "failed",
            BatchStatus::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one element of an input array.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RowResult {
    pub row_index: usize,
    pub record_id: String,
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    /// Grouping label, e.g. `IncidentValidator:MISSING_TITLE`.
    pub test_name: String,
    pub processing_time_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub success_rate: f64,
    pub validation_errors: usize,
    pub validation_warnings: usize,
    pub total_records_processed: usize,
    pub total_tests_ran: usize,
    pub successful_test_names: Vec<String>,
    pub failed_test_names: Vec<String>,
}

impl Summary {
    pub fn from_rows(rows: &[RowResult]) -> Self {
        let valid = rows.iter().filter(|r| r.is_valid).count();
        let mut successful = BTreeSet::new();
        let mut failed = BTreeSet::new();
        for row in rows {
            if row.is_valid {
                successful.insert(row.test_name.clone());
            } else {
                failed.insert(row.test_name.clone());
            }
        }
        let total_tests_ran = successful.union(&failed).count();

        Self {
            success_rate: success_rate(valid as u64, rows.len() as u64),
            validation_errors: rows.iter().map(|r| r.errors.len()).sum(),
            validation_warnings: rows.iter().map(|r| r.warnings.len()).sum(),
            total_records_processed: rows.len(),
            total_tests_ran,
            successful_test_names: successful.into_iter().collect(),
            failed_test_names: failed.into_iter().collect(),
        }
    }
}

/// Outcome of one array validation call. `results` lists failing rows only.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ArrayValidationResult {
    pub batch_id: String,
    pub model_id: String,
    pub status: BatchStatus,
    pub total_records: usize,
    pub valid_records: usize,
    pub invalid_records: usize,
    pub warning_records: usize,
    pub threshold: Option<f64>,
    pub processing_time_ms: u64,
    pub completed_at: DateTime<Utc>,
    pub summary: Summary,
    pub results: Vec<RowResult>,
}

/// Identifier of `record`, or `row_<index>` when it carries none.
///
/// The first identifier field present with a non-null value wins. Strings are
/// taken verbatim (an empty one included); any other value is rendered as JSON.
pub fn detect_record_id(record: &JsonValue, index: usize) -> String {
    if let Some(obj) = record.as_object() {
        for field in IDENTIFIER_FIELDS {
            match obj.get(*field) {
                None | Some(JsonValue::Null) => {}
                Some(JsonValue::String(s)) => return s.clone(),
                Some(other) => return other.to_string(),
            }
        }
    }
    format!("row_{}", index)
}

/// `<Model>Validator[:<code>]`, keyed on the primary error code for invalid rows
/// and the primary warning code for valid rows that carry warnings.
pub fn test_label(
    model_id: &str,
    is_valid: bool,
    errors: &[ValidationIssue],
    warnings: &[ValidationIssue],
) -> String {
    let mut chars = model_id.chars();
    let base = match chars.next() {
        Some(c) => format!("{}{}Validator", c.to_uppercase(), chars.as_str()),
        None => "Validator".to_string(),
    };
    let primary = if is_valid {
        warnings.first()
    } else {
        errors.first()
    };
    match primary {
        Some(issue) => format!("{}:{}", base, issue.code),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_fields_are_checked_in_order() {
        assert_eq!(detect_record_id(&json!({ "uuid": "u-1" }), 3), "u-1");
        assert_eq!(detect_record_id(&json!({ "name": "x" }), 5), "row_5");
        assert_eq!(
            detect_record_id(&json!({ "record_id": "r", "_id": "m" }), 0),
            "m"
        );
        assert_eq!(detect_record_id(&json!({ "ID": 42 }), 0), "42");
        assert_eq!(detect_record_id(&json!({ "id": "" }), 2), "");
        assert_eq!(detect_record_id(&json!({ "id": true }), 2), "true");
        assert_eq!(
            detect_record_id(&json!({ "id": null, "uuid": "u-2" }), 2),
            "u-2"
        );
        assert_eq!(detect_record_id(&json!({ "id": null }), 4), "row_4");
        assert_eq!(detect_record_id(&json!("scalar"), 7), "row_7");
    }

    #[test]
    fn labels_follow_primary_issue() {
        let err = vec![ValidationIssue::new("MISSING_TITLE", "t")];
        let warn = vec![ValidationIssue::new("MISSING_TAGS", "w")];
        assert_eq!(
            test_label("incident", false, &err, &warn),
            "IncidentValidator:MISSING_TITLE"
        );
        assert_eq!(
            test_label("incident", true, &[], &warn),
            "IncidentValidator:MISSING_TAGS"
        );
        assert_eq!(test_label("github", true, &[], &[]), "GithubValidator");
    }

    fn row(index: usize, is_valid: bool, label: &str, errors: usize) -> RowResult {
        RowResult {
            row_index: index,
            record_id: format!("row_{}", index),
            is_valid,
            errors: (0..errors).map(|_| ValidationIssue::new("E", "e")).collect(),
            warnings: Vec::new(),
            test_name: label.to_string(),
            processing_time_ms: 0,
        }
    }

    #[test]
    fn summary_counts_labels_on_both_sides() {
        let rows = vec![
            row(0, true, "A", 0),
            row(1, false, "A", 2),
            row(2, false, "B", 1),
            row(3, true, "C", 0),
        ];
        let s = Summary::from_rows(&rows);
        assert_eq!(s.success_rate, 50.0);
        assert_eq!(s.validation_errors, 3);
        assert_eq!(s.total_records_processed, 4);
        assert_eq!(s.successful_test_names, vec!["A", "C"]);
        assert_eq!(s.failed_test_names, vec!["A", "B"]);
        assert_eq!(s.total_tests_ran, 3);
    }

    #[test]
    fn empty_summary() {
        let s = Summary::from_rows(&[]);
        assert_eq!(s.success_rate, 0.0);
        assert_eq!(s.total_tests_ran, 0);
    }
}
