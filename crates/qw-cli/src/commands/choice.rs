use clap::Subcommand;
use qw_core::{ChoicePath, Edit, SegmentPath};

use super::{Options, parse_choice_path, parse_segment_path};

#[derive(Subcommand)]
pub enum ChoiceAction {
    /// Add an option to a segment, leading to the first segment of the chapter
    Add {
        /// Segment as BRANCH.SEGMENT
        #[arg(value_parser = parse_segment_path)]
        at: SegmentPath,

        /// Insert after this option (default: at the end)
        #[arg(long)]
        after: Option<usize>,
    },

    /// Move an option within its segment
    Move {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Signed offset
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Delete an option (a segment keeps at least one)
    Delete {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,
    },

    /// Replace an option's text
    Text {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// New text
        text: String,
    },

    /// Point an option at another branch and segment
    Goto {
        /// Option as BRANCH.SEGMENT.OPTION
        #[arg(value_parser = parse_choice_path)]
        at: ChoicePath,

        /// Target branch index
        branch: usize,

        /// Target segment index (default: the branch's first segment)
        segment: Option<usize>,
    },
}

pub fn run(opts: &Options, action: ChoiceAction) -> Result<(), String> {
    let edit = match action {
        ChoiceAction::Add { at, after } => Edit::AddChoice { at, after },
        ChoiceAction::Move { at, delta } => Edit::MoveChoice { at, delta },
        ChoiceAction::Delete { at } => Edit::DeleteChoice { at },
        ChoiceAction::Text { at, text } => Edit::SetChoiceText { at, text },
        ChoiceAction::Goto {
            at,
            branch,
            segment,
        } => Edit::RetargetChoice {
            at,
            branch,
            segment,
        },
    };
    super::edit(opts, "option", |_| Ok(edit))
}
