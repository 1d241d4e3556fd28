//! seatvm common types.
//!
//! This crate provides the foundational data structures for the seatvm
//! array machine:
//!
//! - [`Instruction`]: the closed instruction set, loaded from JSON
//! - [`Cursor`]: the two seat cursors, MOCO and CHOCO
//! - [`Program`]: a top-level instruction block with its [`LabelTable`]
//! - [`Challenge`]: initial array, target array and step budget
//! - [`catalog`]: the built-in challenges
//! - [`LoadError`]: errors from reading programs and challenges

pub mod catalog;
pub mod challenge;
pub mod error;
pub mod instruction;
pub mod program;

// Re-export commonly used types at the crate root.
pub use challenge::{Challenge, Difficulty};
pub use error::LoadError;
pub use instruction::{Block, Comparison, Cursor, Instruction};
pub use program::{LabelTable, Program};
