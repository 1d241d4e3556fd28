//! Challenge definitions: a starting seat array, the array the player must
//! produce, and an optional step budget.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// A challenge. Read-only to the VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub initial_array: Vec<i64>,
    pub target_array: Vec<i64>,
    /// Step budget for an optimal solution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,
    #[serde(default = "unlocked_by_default")]
    pub unlocked: bool,
}

fn unlocked_by_default() -> bool {
    true
}

impl Challenge {
    /// An anonymous challenge with no step budget.
    pub fn new(initial_array: Vec<i64>, target_array: Vec<i64>) -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            difficulty: Difficulty::Easy,
            initial_array,
            target_array,
            max_steps: None,
            unlocked: true,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Parse a challenge from its JSON definition.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(LoadError::json("challenge"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_definition() {
        let challenge =
            Challenge::from_json(r#"{"initialArray": [7,0,0,0], "targetArray": [7,7,0,0]}"#)
                .unwrap();
        assert_eq!(challenge.initial_array, vec![7, 0, 0, 0]);
        assert_eq!(challenge.target_array, vec![7, 7, 0, 0]);
        assert_eq!(challenge.max_steps, None);
        assert!(challenge.unlocked);
        assert_eq!(challenge.difficulty, Difficulty::Easy);
    }

    #[test]
    fn parses_full_definition() {
        let challenge = Challenge::from_json(
            r#"{
                "id": "challenge-4",
                "title": "Swap First and Last",
                "description": "Swap the first and last elements of the array.",
                "difficulty": "MEDIUM",
                "initialArray": [10, 20, 30],
                "targetArray": [30, 20, 10],
                "maxSteps": 10,
                "unlocked": false
            }"#,
        )
        .unwrap();
        assert_eq!(challenge.id, "challenge-4");
        assert_eq!(challenge.difficulty, Difficulty::Medium);
        assert_eq!(challenge.max_steps, Some(10));
        assert!(!challenge.unlocked);
    }

    #[test]
    fn missing_target_is_an_error() {
        let err = Challenge::from_json(r#"{"initialArray": [1]}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json { what: "challenge", .. }));
    }

    #[test]
    fn builder_sets_budget_and_id() {
        let challenge = Challenge::new(vec![1], vec![1])
            .with_max_steps(3)
            .with_id("custom");
        assert_eq!(challenge.max_steps, Some(3));
        assert_eq!(challenge.id, "custom");
    }
}
