//! Execution state: seats, cursors, hand, call stack and step counter.

use std::sync::Arc;

use seatvm_common::{Block, Cursor, Instruction, Program};
use serde::Serialize;

use crate::error::ExecError;
use crate::history::History;

/// One level of execution: an instruction block and a position in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub block: Block,
    pub pc: usize,
}

impl Frame {
    pub fn new(block: Block, pc: usize) -> Self {
        Self { block, pc }
    }

    /// The instruction at `pc`, or `None` once the block is exhausted.
    pub fn current(&self) -> Option<&Instruction> {
        self.block.get(self.pc)
    }
}

/// Everything that changes from step to step. History entries are
/// snapshots, which is also what a host persists or renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub array: Vec<i64>,
    pub moco: usize,
    pub choco: usize,
    pub hand: Option<i64>,
    pub call_stack: Vec<Frame>,
    pub step_count: u64,
}

/// A flat, serializable summary of a snapshot for traces and UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub array: Vec<i64>,
    pub moco: usize,
    pub choco: usize,
    pub hand: Option<i64>,
    pub depth: usize,
    pub current_line: usize,
    pub step_count: u64,
}

/// One point in time of a running program.
///
/// The interpreter never mutates a state in place; each step produces a
/// new value whose `history` ends with a snapshot of its predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    pub array: Vec<i64>,
    pub moco: usize,
    pub choco: usize,
    pub hand: Option<i64>,
    /// Innermost frame last. `call_stack[0]` is the top-level program while
    /// the stack is non-empty.
    pub call_stack: Vec<Frame>,
    pub step_count: u64,
    pub history: History,
    program: Arc<Program>,
}

impl ExecutionState {
    /// Fresh state: both cursors on seat 0, empty hand, one frame at the
    /// start of the program.
    pub fn new(initial_array: Vec<i64>, program: Arc<Program>) -> Self {
        let top = Frame::new(program.instructions().clone(), 0);
        Self {
            array: initial_array,
            moco: 0,
            choco: 0,
            hand: None,
            call_stack: vec![top],
            step_count: 0,
            history: History::new(),
            program,
        }
    }

    /// Cap the number of snapshots kept for rewind.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = History::with_limit(limit);
        self
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn cursor(&self, target: Cursor) -> usize {
        match target {
            Cursor::Moco => self.moco,
            Cursor::Choco => self.choco,
        }
    }

    pub(crate) fn cursor_mut(&mut self, target: Cursor) -> &mut usize {
        match target {
            Cursor::Moco => &mut self.moco,
            Cursor::Choco => &mut self.choco,
        }
    }

    /// The cursor's position, checked against the array bounds.
    pub(crate) fn seat(&self, target: Cursor) -> Result<usize, ExecError> {
        let at = self.cursor(target);
        if at < self.array.len() {
            Ok(at)
        } else {
            Err(ExecError::PointerOutOfRange {
                target,
                at,
                length: self.array.len(),
            })
        }
    }

    /// Top-level position, or the program length once the stack is empty.
    pub fn current_line(&self) -> usize {
        self.call_stack
            .first()
            .map(|frame| frame.pc)
            .unwrap_or_else(|| self.program.len())
    }

    /// The instruction the next step will dispatch, if any.
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.call_stack.last().and_then(Frame::current)
    }

    /// Nesting depth; 1 at top level, 0 once the program has finished.
    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn is_finished(&self) -> bool {
        self.call_stack.is_empty()
    }

    /// Copy of everything except history.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            array: self.array.clone(),
            moco: self.moco,
            choco: self.choco,
            hand: self.hand,
            call_stack: self.call_stack.clone(),
            step_count: self.step_count,
        }
    }

    /// Replace everything except history and program with a snapshot.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.array = snapshot.array;
        self.moco = snapshot.moco;
        self.choco = snapshot.choco;
        self.hand = snapshot.hand;
        self.call_stack = snapshot.call_stack;
        self.step_count = snapshot.step_count;
    }

    pub fn view(&self) -> StateView {
        StateView {
            array: self.array.clone(),
            moco: self.moco,
            choco: self.choco,
            hand: self.hand,
            depth: self.depth(),
            current_line: self.current_line(),
            step_count: self.step_count,
        }
    }
}
