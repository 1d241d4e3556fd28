//! Program representation: the top-level instruction block plus its label
//! table.
//!
//! Labels are collected from the top-level block only. A `LABEL` inside a
//! conditional body is never indexed, and when a name appears twice the
//! later occurrence wins.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LoadError;
use crate::instruction::{Block, Instruction};

/// Label name to top-level instruction index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    entries: HashMap<String, usize>,
}

impl LabelTable {
    /// Scan a top-level block for `LABEL` instructions.
    pub fn build(instructions: &[Instruction]) -> Self {
        let mut entries = HashMap::new();
        for (index, instr) in instructions.iter().enumerate() {
            if let Instruction::Label { label_name } = instr {
                entries.insert(label_name.clone(), index);
            }
        }
        Self { entries }
    }

    /// Resolve a label to its top-level index.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.entries.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A seatvm program: an ordered top-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Block,
    labels: LabelTable,
}

impl Program {
    /// Create a program and build its label table.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let labels = LabelTable::build(&instructions);
        Self {
            instructions: instructions.into(),
            labels,
        }
    }

    /// Parse a JSON array of instruction records.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let instructions: Vec<Instruction> =
            serde_json::from_str(text).map_err(LoadError::json("program"))?;
        Ok(Self::new(instructions))
    }

    /// The top-level block.
    pub fn instructions(&self) -> &Block {
        &self.instructions
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Resolve a label to its top-level index.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.labels.resolve(label)
    }

    /// Number of top-level instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of instructions including those nested in conditional bodies.
    pub fn instruction_count(&self) -> usize {
        self.instructions.iter().map(Instruction::count).sum()
    }
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.instructions.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Program {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Instruction>::deserialize(deserializer).map(Program::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Cursor;

    fn label(name: &str) -> Instruction {
        Instruction::Label {
            label_name: name.into(),
        }
    }

    #[test]
    fn empty_program() {
        let program = Program::new(vec![]);
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert!(program.labels().is_empty());
    }

    #[test]
    fn labels_resolve_to_top_level_index() {
        let program = Program::new(vec![Instruction::Wait, label("loop"), Instruction::Swap]);
        assert_eq!(program.resolve("loop"), Some(1));
        assert_eq!(program.resolve("missing"), None);
    }

    #[test]
    fn duplicate_label_last_wins() {
        let program = Program::new(vec![label("x"), Instruction::Wait, label("x")]);
        assert_eq!(program.resolve("x"), Some(2));
        assert_eq!(program.labels().len(), 1);
    }

    #[test]
    fn labels_inside_bodies_are_not_indexed() {
        let program = Program::new(vec![Instruction::IfEqual {
            target: Cursor::Moco,
            body: vec![label("inner")].into(),
        }]);
        assert_eq!(program.resolve("inner"), None);
    }

    #[test]
    fn from_json_builds_labels() {
        let program = Program::from_json(
            r#"[
                {"type": "LABEL", "labelName": "top"},
                {"type": "MOVE_RIGHT", "target": "MOCO"},
                {"type": "JUMP", "label": "top"}
            ]"#,
        )
        .unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.resolve("top"), Some(0));
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = Program::from_json(r#"{"type": "WAIT"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json { what: "program", .. }));
    }

    #[test]
    fn serializes_as_plain_list() {
        let program = Program::new(vec![Instruction::Wait, Instruction::Swap]);
        assert_eq!(
            serde_json::to_string(&program).unwrap(),
            r#"[{"type":"WAIT"},{"type":"SWAP"}]"#
        );
    }

    #[test]
    fn instruction_count_is_recursive() {
        let program = Program::new(vec![
            Instruction::Wait,
            Instruction::IfLess {
                target: Cursor::Choco,
                body: vec![Instruction::Swap, Instruction::Wait].into(),
            },
        ]);
        assert_eq!(program.len(), 2);
        assert_eq!(program.instruction_count(), 4);
    }
}
