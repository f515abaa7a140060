//! Pass/fail rule shared by array validation and batch sessions.

use super::BatchStatus;

/// Slack for the counts-based threshold comparison, per record.
const RATE_EPSILON: f64 = 1e-9;

/// `valid / total * 100`, or 0 for an empty batch.
pub fn success_rate(valid: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    valid as f64 / total as f64 * 100.0
}

/// `valid / total * 100 >= threshold`, compared as `valid * 100 >= threshold * total`
/// so that exactly-at-threshold batches do not fall through on rounding.
pub fn meets_threshold(valid: u64, total: u64, threshold: f64) -> bool {
    let lhs = valid as f64 * 100.0;
    let rhs = threshold * total as f64;
    lhs + RATE_EPSILON * (total.max(1) as f64) >= rhs
}

/// Final status for `valid` and `invalid` counts.
///
/// With a threshold the rate decides. Without one, only a lone invalid record
/// fails; a multi-record batch is never failed on content.
pub fn decide_status(valid: u64, invalid: u64, threshold: Option<f64>) -> BatchStatus {
    let total = valid + invalid;
    let ok = match threshold {
        Some(t) => meets_threshold(valid, total, t),
        None => !(total == 1 && invalid == 1),
    };
    if ok {
        BatchStatus::Success
    } else {
        BatchStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_of_empty_batch_is_zero() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(1, 4), 25.0);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        assert_eq!(decide_status(20, 80, Some(20.0)), BatchStatus::Success);
        assert_eq!(decide_status(19, 81, Some(20.0)), BatchStatus::Failed);
        assert_eq!(decide_status(4, 2, Some(50.0)), BatchStatus::Success);
        assert_eq!(decide_status(1, 5, Some(20.0)), BatchStatus::Failed);
        // 1/3 of 100 does not round its way below 33.333...
        assert_eq!(decide_status(1, 2, Some(100.0 / 3.0)), BatchStatus::Success);
    }

    #[test]
    fn no_threshold_only_fails_a_lone_invalid_record() {
        assert_eq!(decide_status(0, 1, None), BatchStatus::Failed);
        assert_eq!(decide_status(1, 0, None), BatchStatus::Success);
        assert_eq!(decide_status(1, 1, None), BatchStatus::Success);
        assert_eq!(decide_status(0, 5, None), BatchStatus::Success);
        assert_eq!(decide_status(0, 0, None), BatchStatus::Success);
    }

    #[test]
    fn empty_batch_with_threshold() {
        assert_eq!(decide_status(0, 0, Some(0.0)), BatchStatus::Success);
        assert_eq!(decide_status(0, 0, Some(10.0)), BatchStatus::Failed);
    }
}
