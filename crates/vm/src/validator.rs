//! Scores a finished run against a challenge's target array.

use seatvm_common::Challenge;
use serde::Serialize;

use crate::state::ExecutionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub success: bool,
    pub message: String,
    pub step_count: u64,
    /// Solved within the challenge's step budget. Always false on failure.
    pub optimized: bool,
}

impl ValidationResult {
    fn failure(message: String, step_count: u64) -> Self {
        Self {
            success: false,
            message,
            step_count,
            optimized: false,
        }
    }
}

/// Compare the state's array with the challenge target, seat by seat.
pub fn validate(challenge: &Challenge, state: &ExecutionState) -> ValidationResult {
    let actual = &state.array;
    let target = &challenge.target_array;
    let step_count = state.step_count;

    if actual.len() != target.len() {
        return ValidationResult::failure(
            format!(
                "Array length mismatch: expected {}, got {}",
                target.len(),
                actual.len()
            ),
            step_count,
        );
    }

    if let Some((seat, (want, got))) = target
        .iter()
        .zip(actual.iter())
        .enumerate()
        .find(|(_, (want, got))| want != got)
    {
        return ValidationResult::failure(
            format!("Mismatch at seat {seat}: expected {want}, got {got}"),
            step_count,
        );
    }

    // A zero budget means none was set.
    let optimized = challenge
        .max_steps
        .filter(|&budget| budget > 0)
        .map_or(true, |budget| step_count <= budget);

    ValidationResult {
        success: true,
        message: if optimized {
            "Challenge completed optimally!".to_string()
        } else {
            "Challenge completed! Try to optimize your solution.".to_string()
        },
        step_count,
        optimized,
    }
}
