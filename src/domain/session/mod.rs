//! Multi-request batch accumulation.
//!
//! A session lives from `create` through any number of additive updates to a
//! single `finalize`; after that its counts and verdict are frozen.

use crate::domain::validation::{decide_status, success_rate, BatchStatus};
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod manager;

pub use manager::SessionManager;

/// Cross-request accumulation state for one batch id.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSession {
    pub batch_id: String,
    pub threshold: Option<f64>,
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub warning_records: u64,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_final: bool,
    final_status: Option<BatchStatus>,
}

impl BatchSession {
    pub fn new(batch_id: impl Into<String>, threshold: Option<f64>) -> Self {
        let now = Utc::now();
        Self {
            batch_id: batch_id.into(),
            threshold,
            total_records: 0,
            valid_records: 0,
            invalid_records: 0,
            warning_records: 0,
            started_at: now,
            last_updated: now,
            is_final: false,
            final_status: None,
        }
    }

    /// Adds the deltas to the running totals. Returns `Ok(false)` (and changes
    /// nothing) once the session is final.
    ///
    /// Deltas that would overflow a counter are refused as a whole; the
    /// session is left untouched.
    pub fn apply(&mut self, valid: u64, invalid: u64, warnings: u64) -> Result<bool> {
        if self.is_final {
            return Ok(false);
        }
        let overflow = || EngineError::CountOverflow(self.batch_id.clone());
        let valid_records = self.valid_records.checked_add(valid).ok_or_else(overflow)?;
        let invalid_records = self
            .invalid_records
            .checked_add(invalid)
            .ok_or_else(overflow)?;
        let warning_records = self
            .warning_records
            .checked_add(warnings)
            .ok_or_else(overflow)?;
        let total_records = valid_records
            .checked_add(invalid_records)
            .ok_or_else(overflow)?;

        self.valid_records = valid_records;
        self.invalid_records = invalid_records;
        self.warning_records = warning_records;
        self.total_records = total_records;
        self.last_updated = Utc::now();
        Ok(true)
    }

    /// Marks the session final and returns its verdict. The verdict is
    /// computed once; later calls return the stored value.
    pub fn finalize(&mut self) -> BatchStatus {
        if let Some(status) = self.final_status {
            return status;
        }
        let status = decide_status(self.valid_records, self.invalid_records, self.threshold);
        self.final_status = Some(status);
        self.is_final = true;
        self.last_updated = Utc::now();
        status
    }

    pub fn success_rate(&self) -> f64 {
        success_rate(self.valid_records, self.total_records)
    }

    /// `in_progress` until finalized, then the stored verdict.
    pub fn current_status(&self) -> BatchStatus {
        self.final_status.unwrap_or(BatchStatus::InProgress)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            batch_id: self.batch_id.clone(),
            status: self.current_status(),
            total_records: self.total_records,
            valid_records: self.valid_records,
            invalid_records: self.invalid_records,
            warning_records: self.warning_records,
            success_rate: self.success_rate(),
            threshold: self.threshold,
            started_at: self.started_at,
            last_updated: self.last_updated,
            is_final: self.is_final,
        }
    }
}

/// Read-only snapshot of a session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub batch_id: String,
    pub status: BatchStatus,
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub warning_records: u64,
    pub success_rate: f64,
    pub threshold: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_final: bool,
}
