use clap::Subcommand;
use qw_core::rule::Comparator;
use qw_core::{ChoicePath, Edit, TypedValue};

use super::{Options, parse_choice_path, parse_comparator, parse_value, variable_id};

#[derive(Subcommand)]
pub enum ConditionAction {
    /// Gate an option on a variable (compares with == against its initial value)
    Add {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Variable id or name
        variable: String,

        /// Insert after this condition (default: at the end)
        #[arg(long)]
        after: Option<usize>,
    },

    /// Move a condition within its option
    Move {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Condition index
        index: usize,

        /// Signed offset
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Delete a condition
    Delete {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Condition index
        index: usize,
    },

    /// Test another variable; comparator and value adapt to its type
    Variable {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Condition index
        index: usize,

        /// Variable id or name
        variable: String,
    },

    /// Change how the variable is compared (== != > >= < <=)
    Comparator {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Condition index
        index: usize,

        /// Comparator symbol or name
        #[arg(value_parser = parse_comparator)]
        comparator: Comparator,
    },

    /// Change the constant the variable is compared against
    Value {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Condition index
        index: usize,

        /// true, false or a number
        #[arg(value_parser = parse_value, allow_negative_numbers = true)]
        value: TypedValue,
    },
}

pub fn run(opts: &Options, action: ConditionAction) -> Result<(), String> {
    super::edit(opts, "condition", |chapter| {
        Ok(match action {
            ConditionAction::Add {
                at,
                variable,
                after,
            } => Edit::AddCondition {
                at,
                after,
                variable: variable_id(chapter, &variable),
            },
            ConditionAction::Move { at, index, delta } => Edit::MoveCondition { at, index, delta },
            ConditionAction::Delete { at, index } => Edit::DeleteCondition { at, index },
            ConditionAction::Variable {
                at,
                index,
                variable,
            } => Edit::SetConditionVariable {
                at,
                index,
                variable: variable_id(chapter, &variable),
            },
            ConditionAction::Comparator {
                at,
                index,
                comparator,
            } => Edit::SetConditionComparator {
                at,
                index,
                comparator,
            },
            ConditionAction::Value { at, index, value } => {
                Edit::SetConditionValue { at, index, value }
            }
        })
    })
}
