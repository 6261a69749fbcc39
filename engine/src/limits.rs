//! Repeat-count policy, checked before any evaluator call.

use dicer_types::{RollError, RollLimits};

/// Accept `raw` as a repeat count if it is a finite whole number in `[1, max_roll_times]`.
pub fn check_repeat_count(raw: f64, limits: &RollLimits) -> Result<u32, RollError> {
    let max = limits.max_roll_times();
    let in_range = raw.is_finite() && raw.fract() == 0.0 && raw >= 1.0 && raw <= f64::from(max);
    if !in_range {
        tracing::debug!(repeat = raw, max, "Repeat count rejected");
        return Err(RollError::Limit { max });
    }
    Ok(raw as u32)
}
