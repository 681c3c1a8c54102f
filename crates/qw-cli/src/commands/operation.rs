use clap::Subcommand;
use qw_core::rule::OperationKind;
use qw_core::{ChoicePath, Edit, TypedValue};

use super::{Options, parse_choice_path, parse_operation_kind, parse_value, variable_id};

#[derive(Subcommand)]
pub enum OperationAction {
    /// Make an option change a variable (sets it to its initial value)
    Add {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Variable id or name
        variable: String,

        /// Insert after this operation (default: at the end)
        #[arg(long)]
        after: Option<usize>,
    },

    /// Move an operation within its option
    Move {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Operation index
        index: usize,

        /// Signed offset
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Delete an operation
    Delete {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Operation index
        index: usize,
    },

    /// Change another variable; kind and value adapt to its type
    Variable {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Operation index
        index: usize,

        /// Variable id or name
        variable: String,
    },

    /// Change how the variable is updated (= += -= *= /=)
    Kind {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Operation index
        index: usize,

        /// Operation symbol or name
        #[arg(value_parser = parse_operation_kind)]
        kind: OperationKind,
    },

    /// Change the operand
    Value {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Operation index
        index: usize,

        /// true, false or a number
        #[arg(value_parser = parse_value, allow_negative_numbers = true)]
        value: TypedValue,
    },
}

pub fn run(opts: &Options, action: OperationAction) -> Result<(), String> {
    super::edit(opts, "operation", |chapter| {
        Ok(match action {
            OperationAction::Add {
                at,
                variable,
                after,
            } => Edit::AddOperation {
                at,
                after,
                variable: variable_id(chapter, &variable),
            },
            OperationAction::Move { at, index, delta } => Edit::MoveOperation { at, index, delta },
            OperationAction::Delete { at, index } => Edit::DeleteOperation { at, index },
            OperationAction::Variable {
                at,
                index,
                variable,
            } => Edit::SetOperationVariable {
                at,
                index,
                variable: variable_id(chapter, &variable),
            },
            OperationAction::Kind { at, index, kind } => Edit::SetOperationKind { at, index, kind },
            OperationAction::Value { at, index, value } => {
                Edit::SetOperationValue { at, index, value }
            }
        })
    })
}
