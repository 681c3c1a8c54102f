use clap::Subcommand;
use qw_core::{Edit, TypedValue, ValueKind};

use super::{Options, parse_value, parse_value_kind, variable_id};

#[derive(Subcommand)]
pub enum VariableAction {
    /// Add a variable initialised to false or 0
    Add {
        /// bool or number
        #[arg(value_parser = parse_value_kind)]
        kind: ValueKind,

        /// Insert after this variable (default: at the end)
        #[arg(long)]
        after: Option<usize>,
    },

    /// Move a variable in the list
    Move {
        /// Variable index
        index: usize,

        /// Signed offset
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Delete a variable with every condition and operation using it
    Delete {
        /// Variable id or name
        variable: String,
    },

    /// Rename a variable
    Rename {
        /// Variable id or name
        variable: String,

        /// New name
        name: String,
    },

    /// Change a variable's starting value (its type cannot change)
    Initial {
        /// Variable id or name
        variable: String,

        /// true, false or a number
        #[arg(value_parser = parse_value, allow_negative_numbers = true)]
        value: TypedValue,
    },
}

pub fn run(opts: &Options, action: VariableAction) -> Result<(), String> {
    super::edit(opts, "variable", |chapter| {
        Ok(match action {
            VariableAction::Add { kind, after } => Edit::AddVariable { kind, after },
            VariableAction::Move { index, delta } => Edit::MoveVariable { index, delta },
            VariableAction::Delete { variable } => Edit::DeleteVariable {
                id: variable_id(chapter, &variable),
            },
            VariableAction::Rename { variable, name } => Edit::RenameVariable {
                id: variable_id(chapter, &variable),
                name,
            },
            VariableAction::Initial { variable, value } => Edit::SetVariableInitialValue {
                id: variable_id(chapter, &variable),
                value,
            },
        })
    })
}
