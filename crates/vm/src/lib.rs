//! seatvm virtual machine: steps player programs over a seat array.
//!
//! The machine has:
//! - A seat array of integers and two cursors, MOCO and CHOCO
//! - A single-slot hand register
//! - A call stack of frames, one per entered conditional block
//! - A snapshot history for rewind
//!
//! [`execute_step`] is pure: it takes a state and returns a new one, so a
//! host can pause between any two steps and rewind exactly.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use seatvm_common::{Challenge, Cursor, Instruction, Program};
//! use seatvm_vm::{execute_step, validate, ExecutionState};
//!
//! let program = Arc::new(Program::new(vec![
//!     Instruction::Pick { target: Cursor::Moco },
//!     Instruction::MoveRight { target: Cursor::Moco },
//!     Instruction::Put { target: Cursor::Moco },
//! ]));
//!
//! let mut state = ExecutionState::new(vec![7, 0, 0, 0], program);
//! for _ in 0..3 {
//!     state = execute_step(&state).state;
//! }
//! assert_eq!(state.array, vec![7, 7, 0, 0]);
//!
//! let challenge = Challenge::new(vec![7, 0, 0, 0], vec![7, 7, 0, 0]).with_max_steps(3);
//! let result = validate(&challenge, &state);
//! assert!(result.success && result.optimized);
//! ```

pub mod error;
pub mod execute;
pub mod history;
pub mod session;
pub mod state;
pub mod validator;

pub use error::{BoundaryPolicy, ErrorContext, ErrorKind, ErrorPolicy, ExecError, Severity};
pub use execute::{execute_step, ExecutionResult};
pub use history::{rewind, History};
pub use session::{
    CompletionEvent, CompletionSink, ExecutionMode, RunOutcome, Session, SinkError, Status,
    StepOutcome,
};
pub use state::{ExecutionState, Frame, Snapshot, StateView};
pub use validator::{validate, ValidationResult};
