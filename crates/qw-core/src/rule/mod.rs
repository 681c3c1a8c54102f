//! Condition / operation engine.
//!
//! Conditions gate choices, operations are their consequences. Both refer to
//! story variables by id and restrict their comparator or kind to what the
//! variable's type supports.

mod condition;
mod operation;
mod state;

pub use condition::{CompareTo, Comparator, Condition, Operand};
pub use operation::{Operation, OperationKind};
pub use state::VariableState;
