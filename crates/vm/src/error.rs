//! Step errors for the seatvm interpreter.
//!
//! A failed step is returned as data, never raised. Each error carries an
//! [`ErrorContext`] the host can use to highlight the offending
//! instruction, cursor or seats.

use seatvm_common::Cursor;
use serde::Serialize;
use thiserror::Error;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A cursor would leave the seat array, or already sits outside it.
    PointerOutOfRange,
    /// `PUT` or a hand comparison ran before any `PICK`.
    HandEmpty,
    /// A jump named a label the top-level program does not define.
    LabelNotFound,
    /// `SET_POINTER` or `SET_VALUE` was given an invalid literal.
    ArrayIndexOutOfRange,
    /// The instruction is not part of the instruction set.
    UnknownInstruction,
    /// The call stack is already empty.
    ProgramCompleted,
}

/// Where the error happened, for UI highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorContext {
    /// The instruction at `pc` in the frame at call-stack `depth`
    /// (0 is the top-level program).
    Instruction { depth: usize, pc: usize },
    Pointer { target: Cursor },
    ArrayIndex { index: i64 },
    /// A pair of seats, `from` and `to` inclusive.
    ArrayRange { from: usize, to: usize },
    None,
}

/// A failed step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ExecError {
    #[error("{target} cannot move past seat {at}")]
    CannotMove { target: Cursor, at: usize },

    #[error("{target} is out of range at seat {at} (length {length})")]
    PointerOutOfRange {
        target: Cursor,
        at: usize,
        length: usize,
    },

    #[error("cannot swap seat {at} with the next seat (length {length})")]
    CannotSwapWithNext { at: usize, length: usize },

    #[error("hand is empty at instruction {pc} (depth {depth})")]
    HandEmpty { depth: usize, pc: usize },

    #[error("label \"{label}\" not found")]
    LabelNotFound {
        label: String,
        depth: usize,
        pc: usize,
    },

    #[error("seat index {index} out of range (length {length})")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("value {value} must not be negative at instruction {pc} (depth {depth})")]
    NegativeValue { value: i64, depth: usize, pc: usize },

    #[error("unknown instruction at {pc} (depth {depth})")]
    UnknownInstruction { depth: usize, pc: usize },

    #[error("program completed")]
    ProgramCompleted,
}

impl ExecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::CannotMove { .. }
            | ExecError::PointerOutOfRange { .. }
            | ExecError::CannotSwapWithNext { .. } => ErrorKind::PointerOutOfRange,
            ExecError::HandEmpty { .. } => ErrorKind::HandEmpty,
            ExecError::LabelNotFound { .. } => ErrorKind::LabelNotFound,
            ExecError::IndexOutOfRange { .. } | ExecError::NegativeValue { .. } => {
                ErrorKind::ArrayIndexOutOfRange
            }
            ExecError::UnknownInstruction { .. } => ErrorKind::UnknownInstruction,
            ExecError::ProgramCompleted => ErrorKind::ProgramCompleted,
        }
    }

    pub fn context(&self) -> ErrorContext {
        match self {
            ExecError::CannotMove { target, .. } | ExecError::PointerOutOfRange { target, .. } => {
                ErrorContext::Pointer { target: *target }
            }
            ExecError::CannotSwapWithNext { at, .. } => ErrorContext::ArrayRange {
                from: *at,
                to: at.saturating_add(1),
            },
            ExecError::IndexOutOfRange { index, .. } => ErrorContext::ArrayIndex { index: *index },
            ExecError::HandEmpty { depth, pc }
            | ExecError::LabelNotFound { depth, pc, .. }
            | ExecError::NegativeValue { depth, pc, .. }
            | ExecError::UnknownInstruction { depth, pc } => ErrorContext::Instruction {
                depth: *depth,
                pc: *pc,
            },
            ExecError::ProgramCompleted => ErrorContext::None,
        }
    }
}

/// How the host should treat a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The attempt is over; stop quietly and validate the array.
    Soft,
    /// Halt and show the error to the player.
    Hard,
}

/// Host-supplied classification of step errors.
pub trait ErrorPolicy {
    fn severity(&self, error: &ExecError) -> Severity;
}

/// Treats running a cursor off either end of the array as the end of the
/// attempt. Everything else is a hard fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryPolicy;

impl ErrorPolicy for BoundaryPolicy {
    fn severity(&self, error: &ExecError) -> Severity {
        match error.kind() {
            ErrorKind::PointerOutOfRange => Severity::Soft,
            ErrorKind::HandEmpty
            | ErrorKind::LabelNotFound
            | ErrorKind::ArrayIndexOutOfRange
            | ErrorKind::UnknownInstruction
            | ErrorKind::ProgramCompleted => Severity::Hard,
        }
    }
}

impl<F> ErrorPolicy for F
where
    F: Fn(&ExecError) -> Severity,
{
    fn severity(&self, error: &ExecError) -> Severity {
        self(error)
    }
}
