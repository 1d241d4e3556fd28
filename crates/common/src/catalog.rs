//! Built-in challenges.

use crate::challenge::{Challenge, Difficulty};
use crate::error::LoadError;

struct Entry {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    difficulty: Difficulty,
    initial: &'static [i64],
    target: &'static [i64],
    max_steps: u64,
    unlocked: bool,
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: "challenge-1",
        title: "Find Maximum",
        description: "Find the maximum value in the array and store it at index 0.",
        difficulty: Difficulty::Easy,
        initial: &[3, 7, 2, 9, 1, 5],
        target: &[9, 7, 2, 9, 1, 5],
        max_steps: 46,
        unlocked: true,
    },
    Entry {
        id: "challenge-2",
        title: "Reverse Array",
        description: "Reverse the array in-place.",
        difficulty: Difficulty::Easy,
        initial: &[1, 2, 3, 4, 5],
        target: &[5, 4, 3, 2, 1],
        max_steps: 20,
        unlocked: true,
    },
    Entry {
        id: "challenge-3",
        title: "Count Even Numbers",
        description: "Count the number of even numbers and store the count at index 0.",
        difficulty: Difficulty::Easy,
        initial: &[2, 5, 8, 3, 6, 1],
        target: &[3, 5, 8, 3, 6, 1],
        max_steps: 25,
        unlocked: true,
    },
    Entry {
        id: "challenge-4",
        title: "Swap First and Last",
        description: "Swap the first and last elements of the array.",
        difficulty: Difficulty::Easy,
        initial: &[10, 20, 30, 40, 50],
        target: &[50, 20, 30, 40, 10],
        max_steps: 10,
        unlocked: true,
    },
    Entry {
        id: "challenge-5",
        title: "Move Zeros to End",
        description: "Move all zeros to the end of the array while keeping the order of non-zero elements.",
        difficulty: Difficulty::Medium,
        initial: &[0, 1, 0, 3, 12, 0],
        target: &[1, 3, 12, 0, 0, 0],
        max_steps: 30,
        unlocked: true,
    },
    Entry {
        id: "challenge-6",
        title: "Find Duplicate",
        description: "The array holds 1 to n with one duplicate. Store the duplicate at index 0.",
        difficulty: Difficulty::Medium,
        initial: &[1, 3, 4, 2, 2],
        target: &[2, 3, 4, 2, 2],
        max_steps: 25,
        unlocked: true,
    },
    Entry {
        id: "challenge-7",
        title: "Two Sum",
        description: "Find two numbers that add up to 9 and store them at indices 0 and 1.",
        difficulty: Difficulty::Medium,
        initial: &[2, 7, 11, 15],
        target: &[2, 7, 11, 15],
        max_steps: 35,
        unlocked: true,
    },
    Entry {
        id: "challenge-8",
        title: "Sort Array (Bubble Sort)",
        description: "Sort the array in ascending order using bubble sort.",
        difficulty: Difficulty::Medium,
        initial: &[64, 34, 25, 12, 22, 11, 90],
        target: &[11, 12, 22, 25, 34, 64, 90],
        max_steps: 50,
        unlocked: true,
    },
    Entry {
        id: "challenge-9",
        title: "Find Missing Number",
        description: "The array holds 0 to n with one number missing. Store it at index 0.",
        difficulty: Difficulty::Hard,
        initial: &[3, 0, 1],
        target: &[2, 0, 1],
        max_steps: 20,
        unlocked: false,
    },
    Entry {
        id: "challenge-10",
        title: "Product Except Self",
        description: "Replace each element with the product of all other elements.",
        difficulty: Difficulty::Hard,
        initial: &[1, 2, 3, 4],
        target: &[24, 12, 8, 6],
        max_steps: 40,
        unlocked: false,
    },
];

impl Entry {
    fn to_challenge(&self) -> Challenge {
        Challenge {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            difficulty: self.difficulty,
            initial_array: self.initial.to_vec(),
            target_array: self.target.to_vec(),
            max_steps: Some(self.max_steps),
            unlocked: self.unlocked,
        }
    }
}

/// All built-in challenges in presentation order.
pub fn challenges() -> Vec<Challenge> {
    ENTRIES.iter().map(Entry::to_challenge).collect()
}

/// Look up a built-in challenge by id.
pub fn find(id: &str) -> Result<Challenge, LoadError> {
    ENTRIES
        .iter()
        .find(|entry| entry.id == id)
        .map(Entry::to_challenge)
        .ok_or_else(|| LoadError::UnknownChallenge(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = ENTRIES.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), ENTRIES.len());
    }

    #[test]
    fn seat_counts_match() {
        for challenge in challenges() {
            assert_eq!(
                challenge.initial_array.len(),
                challenge.target_array.len(),
                "{}",
                challenge.id
            );
        }
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("challenge-4").unwrap().title, "Swap First and Last");
        assert!(matches!(
            find("challenge-99"),
            Err(LoadError::UnknownChallenge(id)) if id == "challenge-99"
        ));
    }

    #[test]
    fn hard_challenges_start_locked() {
        for challenge in challenges() {
            if challenge.difficulty == Difficulty::Hard {
                assert!(!challenge.unlocked, "{}", challenge.id);
            }
        }
    }
}
