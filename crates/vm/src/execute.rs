//! Single-step interpreter and instruction dispatch.

use seatvm_common::{Block, Comparison, Cursor, Instruction};
use tracing::{debug, trace};

use crate::error::{ErrorContext, ErrorKind, ExecError};
use crate::state::{ExecutionState, Frame};

/// The outcome of one call to [`execute_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The new state. Always complete, even when the step failed.
    pub state: ExecutionState,
    pub success: bool,
    /// The call stack is empty; there is nothing left to run.
    pub completed: bool,
    pub error: Option<ExecError>,
}

impl ExecutionResult {
    fn ok(state: ExecutionState) -> Self {
        let completed = state.is_finished();
        Self {
            state,
            success: true,
            completed,
            error: None,
        }
    }

    fn failed(state: ExecutionState, error: ExecError) -> Self {
        Self {
            state,
            success: false,
            completed: false,
            error: Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ExecError::kind)
    }

    pub fn error_context(&self) -> Option<ErrorContext> {
        self.error.as_ref().map(ExecError::context)
    }
}

/// Execute one step.
///
/// The input is never modified. The returned state's history ends with a
/// snapshot of the input, whether or not the step succeeded. A failed step
/// changes nothing else: the program counter stays put and the step count
/// does not move.
pub fn execute_step(state: &ExecutionState) -> ExecutionResult {
    let mut next = state.clone();
    next.history.push(state.snapshot());

    let Some(frame) = next.call_stack.last() else {
        let mut result = ExecutionResult::failed(next, ExecError::ProgramCompleted);
        result.completed = true;
        return result;
    };

    // Falling off the end of a block costs a step, like entering it did.
    if frame.pc >= frame.block.len() {
        next.call_stack.pop();
        if let Some(parent) = next.call_stack.last_mut() {
            parent.pc += 1;
            next.step_count += 1;
            trace!(depth = next.depth(), step = next.step_count, "block exited");
        } else {
            debug!(steps = next.step_count, "program completed");
        }
        return ExecutionResult::ok(next);
    }

    let block = frame.block.clone();
    let instr = &block[frame.pc];

    match next.dispatch(instr) {
        Ok(()) => {
            next.step_count += 1;
            trace!(
                instr = instr.name(),
                line = next.current_line(),
                depth = next.depth(),
                step = next.step_count,
                "step"
            );
            ExecutionResult::ok(next)
        }
        Err(error) => {
            debug!(instr = instr.name(), %error, "step failed");
            ExecutionResult::failed(next, error)
        }
    }
}

impl ExecutionState {
    /// Apply one instruction. Every precondition is checked before anything
    /// is written, so an error leaves the state untouched.
    fn dispatch(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        match instr {
            Instruction::MoveLeft { target } => self.exec_move_left(*target),
            Instruction::MoveRight { target } => self.exec_move_right(*target),
            Instruction::MoveToEnd { target } => self.exec_move_to_end(*target),
            Instruction::SetPointer { target, index } => self.exec_set_pointer(*target, *index),
            Instruction::SetValue { target, value } => self.exec_set_value(*target, *value),
            Instruction::Pick { target } => self.exec_pick(*target),
            Instruction::Put { target } => self.exec_put(*target),
            Instruction::Swap => self.exec_swap(),
            Instruction::SwapWithNext { target } => self.exec_swap_with_next(*target),
            Instruction::IncrementValue { target } => {
                self.exec_adjust(*target, |v| v.wrapping_add(1))
            }
            Instruction::DecrementValue { target } => {
                self.exec_adjust(*target, |v| v.wrapping_sub(1))
            }

            Instruction::IfGreater { .. }
            | Instruction::IfLess { .. }
            | Instruction::IfEqual { .. }
            | Instruction::IfNotEqual { .. } => match instr.conditional() {
                Some((cmp, target, body)) => self.exec_if(cmp, target, body),
                None => Err(self.unknown()),
            },

            Instruction::IfEnd { target, label } => {
                let at_end = self.array.len().checked_sub(1) == Some(self.cursor(*target));
                self.jump_if(at_end, label)
            }
            Instruction::IfMeet { label } => {
                let met = self.moco == self.choco;
                self.jump_if(met, label)
            }
            Instruction::Jump { label } => self.jump(label),

            Instruction::Label { .. } | Instruction::Wait => {
                self.advance();
                Ok(())
            }

            Instruction::Unknown => Err(self.unknown()),
        }
    }

    /// Depth and pc of the instruction being dispatched.
    fn location(&self) -> (usize, usize) {
        let depth = self.call_stack.len().saturating_sub(1);
        let pc = self.call_stack.last().map(|f| f.pc).unwrap_or(0);
        (depth, pc)
    }

    fn unknown(&self) -> ExecError {
        let (depth, pc) = self.location();
        ExecError::UnknownInstruction { depth, pc }
    }

    fn advance(&mut self) {
        if let Some(frame) = self.call_stack.last_mut() {
            frame.pc += 1;
        }
    }

    fn held(&self) -> Result<i64, ExecError> {
        let (depth, pc) = self.location();
        self.hand.ok_or(ExecError::HandEmpty { depth, pc })
    }

    // ---- Cursor movement ----

    fn exec_move_left(&mut self, target: Cursor) -> Result<(), ExecError> {
        let at = self.seat(target)?;
        if at == 0 {
            return Err(ExecError::CannotMove { target, at });
        }
        *self.cursor_mut(target) = at - 1;
        self.advance();
        Ok(())
    }

    fn exec_move_right(&mut self, target: Cursor) -> Result<(), ExecError> {
        let at = self.seat(target)?;
        if at + 1 >= self.array.len() {
            return Err(ExecError::CannotMove { target, at });
        }
        *self.cursor_mut(target) = at + 1;
        self.advance();
        Ok(())
    }

    fn exec_move_to_end(&mut self, target: Cursor) -> Result<(), ExecError> {
        let Some(last) = self.array.len().checked_sub(1) else {
            return Err(ExecError::PointerOutOfRange {
                target,
                at: self.cursor(target),
                length: 0,
            });
        };
        *self.cursor_mut(target) = last;
        self.advance();
        Ok(())
    }

    fn exec_set_pointer(&mut self, target: Cursor, index: i64) -> Result<(), ExecError> {
        let length = self.array.len();
        let at = usize::try_from(index)
            .ok()
            .filter(|&at| at < length)
            .ok_or(ExecError::IndexOutOfRange { index, length })?;
        *self.cursor_mut(target) = at;
        self.advance();
        Ok(())
    }

    // ---- Seat data ----

    fn exec_set_value(&mut self, target: Cursor, value: i64) -> Result<(), ExecError> {
        if value < 0 {
            let (depth, pc) = self.location();
            return Err(ExecError::NegativeValue { value, depth, pc });
        }
        let at = self.seat(target)?;
        self.array[at] = value;
        self.advance();
        Ok(())
    }

    fn exec_pick(&mut self, target: Cursor) -> Result<(), ExecError> {
        let at = self.seat(target)?;
        self.hand = Some(self.array[at]);
        self.advance();
        Ok(())
    }

    /// Copies the hand into the seat. The hand keeps its value.
    fn exec_put(&mut self, target: Cursor) -> Result<(), ExecError> {
        let at = self.seat(target)?;
        let value = self.held()?;
        self.array[at] = value;
        self.advance();
        Ok(())
    }

    fn exec_swap(&mut self) -> Result<(), ExecError> {
        let m = self.seat(Cursor::Moco)?;
        let c = self.seat(Cursor::Choco)?;
        self.array.swap(m, c);
        self.advance();
        Ok(())
    }

    fn exec_swap_with_next(&mut self, target: Cursor) -> Result<(), ExecError> {
        let at = self.cursor(target);
        let length = self.array.len();
        if at + 1 >= length {
            return Err(ExecError::CannotSwapWithNext { at, length });
        }
        self.array.swap(at, at + 1);
        self.advance();
        Ok(())
    }

    fn exec_adjust(&mut self, target: Cursor, op: fn(i64) -> i64) -> Result<(), ExecError> {
        let at = self.seat(target)?;
        self.array[at] = op(self.array[at]);
        self.advance();
        Ok(())
    }

    // ---- Control flow ----

    /// Enter `body` when `hand <cmp> seat` holds; otherwise skip it. The
    /// outer pc moves past the conditional only when its frame is popped.
    fn exec_if(
        &mut self,
        cmp: Comparison,
        target: Cursor,
        body: &Block,
    ) -> Result<(), ExecError> {
        let hand = self.held()?;
        let at = self.seat(target)?;
        if cmp.holds(hand, self.array[at]) {
            self.call_stack.push(Frame::new(body.clone(), 0));
        } else {
            self.advance();
        }
        Ok(())
    }

    fn jump_if(&mut self, taken: bool, label: &str) -> Result<(), ExecError> {
        if taken {
            self.jump(label)
        } else {
            self.advance();
            Ok(())
        }
    }

    /// Collapse the call stack to a single top-level frame at `label`,
    /// leaving every open conditional block.
    fn jump(&mut self, label: &str) -> Result<(), ExecError> {
        let Some(index) = self.program().resolve(label) else {
            let (depth, pc) = self.location();
            return Err(ExecError::LabelNotFound {
                label: label.to_string(),
                depth,
                pc,
            });
        };
        let top = self.program().instructions().clone();
        self.call_stack = vec![Frame::new(top, index)];
        Ok(())
    }
}
