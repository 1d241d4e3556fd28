//! The seatvm instruction set.
//!
//! Programs arrive as JSON records tagged by a `"type"` field:
//! ```text
//! {"type": "PICK", "target": "MOCO"}
//! {"type": "IF_GREATER", "target": "CHOCO", "body": [ ... ]}
//! {"type": "JUMP", "label": "loop"}
//! ```
//! Editor metadata such as `id` or `lineNumber` is accepted and ignored.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A shared, immutable list of instructions: the top-level program or the
/// body of a structured conditional.
pub type Block = Arc<[Instruction]>;

/// One of the two cursors into the seat array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cursor {
    Moco,
    Choco,
}

impl Cursor {
    pub const ALL: [Cursor; 2] = [Cursor::Moco, Cursor::Choco];
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Moco => write!(f, "MOCO"),
            Cursor::Choco => write!(f, "CHOCO"),
        }
    }
}

/// Comparison performed by a structured conditional between the hand and
/// the seat under its cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Greater,
    Less,
    Equal,
    NotEqual,
}

impl Comparison {
    /// Evaluate `hand <op> seat`.
    pub fn holds(self, hand: i64, seat: i64) -> bool {
        match self {
            Comparison::Greater => hand > seat,
            Comparison::Less => hand < seat,
            Comparison::Equal => hand == seat,
            Comparison::NotEqual => hand != seat,
        }
    }
}

/// A single instruction. Each variant carries only the operands it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    /// Move the cursor one seat to the left.
    MoveLeft { target: Cursor },
    /// Move the cursor one seat to the right.
    MoveRight { target: Cursor },
    /// Move the cursor to the last seat.
    MoveToEnd { target: Cursor },
    /// Place the cursor on a literal seat index.
    SetPointer { target: Cursor, index: i64 },
    /// Overwrite the seat under the cursor with a literal, non-negative value.
    SetValue { target: Cursor, value: i64 },
    /// Copy the seat under the cursor into the hand.
    Pick { target: Cursor },
    /// Copy the hand into the seat under the cursor.
    Put { target: Cursor },
    /// Exchange the seats under MOCO and CHOCO.
    Swap,
    /// Exchange the seat under the cursor with its right neighbour.
    SwapWithNext { target: Cursor },
    IncrementValue { target: Cursor },
    DecrementValue { target: Cursor },

    // Structured conditionals: enter `body` when `hand <op> seat` holds.
    IfGreater { target: Cursor, body: Block },
    IfLess { target: Cursor, body: Block },
    IfEqual { target: Cursor, body: Block },
    IfNotEqual { target: Cursor, body: Block },

    /// Jump to `label` when the cursor sits on the last seat.
    IfEnd { target: Cursor, label: String },
    /// Jump to `label` when both cursors sit on the same seat.
    IfMeet { label: String },
    /// Unconditional jump to a top-level label.
    Jump { label: String },
    /// A named address in the top-level program.
    Label {
        #[serde(rename = "labelName")]
        label_name: String,
    },
    /// Do nothing for one step.
    Wait,

    /// Any record whose `type` tag is not part of the instruction set.
    #[serde(other)]
    Unknown,
}

impl Instruction {
    /// The wire tag of this instruction, as it appears in JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::MoveLeft { .. } => "MOVE_LEFT",
            Instruction::MoveRight { .. } => "MOVE_RIGHT",
            Instruction::MoveToEnd { .. } => "MOVE_TO_END",
            Instruction::SetPointer { .. } => "SET_POINTER",
            Instruction::SetValue { .. } => "SET_VALUE",
            Instruction::Pick { .. } => "PICK",
            Instruction::Put { .. } => "PUT",
            Instruction::Swap => "SWAP",
            Instruction::SwapWithNext { .. } => "SWAP_WITH_NEXT",
            Instruction::IncrementValue { .. } => "INCREMENT_VALUE",
            Instruction::DecrementValue { .. } => "DECREMENT_VALUE",
            Instruction::IfGreater { .. } => "IF_GREATER",
            Instruction::IfLess { .. } => "IF_LESS",
            Instruction::IfEqual { .. } => "IF_EQUAL",
            Instruction::IfNotEqual { .. } => "IF_NOT_EQUAL",
            Instruction::IfEnd { .. } => "IF_END",
            Instruction::IfMeet { .. } => "IF_MEET",
            Instruction::Jump { .. } => "JUMP",
            Instruction::Label { .. } => "LABEL",
            Instruction::Wait => "WAIT",
            Instruction::Unknown => "UNKNOWN",
        }
    }

    /// The cursor this instruction operates on, if it is cursor-scoped.
    pub fn target(&self) -> Option<Cursor> {
        match self {
            Instruction::MoveLeft { target }
            | Instruction::MoveRight { target }
            | Instruction::MoveToEnd { target }
            | Instruction::SetPointer { target, .. }
            | Instruction::SetValue { target, .. }
            | Instruction::Pick { target }
            | Instruction::Put { target }
            | Instruction::SwapWithNext { target }
            | Instruction::IncrementValue { target }
            | Instruction::DecrementValue { target }
            | Instruction::IfGreater { target, .. }
            | Instruction::IfLess { target, .. }
            | Instruction::IfEqual { target, .. }
            | Instruction::IfNotEqual { target, .. }
            | Instruction::IfEnd { target, .. } => Some(*target),
            Instruction::Swap
            | Instruction::IfMeet { .. }
            | Instruction::Jump { .. }
            | Instruction::Label { .. }
            | Instruction::Wait
            | Instruction::Unknown => None,
        }
    }

    /// For structured conditionals: the comparison, cursor and nested block.
    pub fn conditional(&self) -> Option<(Comparison, Cursor, &Block)> {
        match self {
            Instruction::IfGreater { target, body } => Some((Comparison::Greater, *target, body)),
            Instruction::IfLess { target, body } => Some((Comparison::Less, *target, body)),
            Instruction::IfEqual { target, body } => Some((Comparison::Equal, *target, body)),
            Instruction::IfNotEqual { target, body } => {
                Some((Comparison::NotEqual, *target, body))
            }
            _ => None,
        }
    }

    /// The nested block of a structured conditional.
    pub fn body(&self) -> Option<&Block> {
        self.conditional().map(|(_, _, body)| body)
    }

    /// Number of instructions including everything nested inside bodies.
    pub fn count(&self) -> usize {
        1 + self
            .body()
            .map(|body| body.iter().map(Instruction::count).sum())
            .unwrap_or(0)
    }
}
