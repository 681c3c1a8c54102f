use clap::Subcommand;
use qw_core::Edit;

use super::Options;

#[derive(Subcommand)]
pub enum BranchAction {
    /// Add a branch whose segment loops back to the first branch
    Add {
        /// Insert after this branch (default: just before @endings)
        #[arg(long)]
        after: Option<usize>,
    },

    /// Move a branch up (-1) or down (+1)
    Move {
        /// Branch index
        index: usize,

        /// Signed offset
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Delete a branch; options leading into it are redirected
    Delete {
        /// Branch index
        index: usize,
    },

    /// Rename a branch
    Title {
        /// Branch index
        index: usize,

        /// New title
        title: String,
    },
}

pub fn run(opts: &Options, action: BranchAction) -> Result<(), String> {
    let edit = match action {
        BranchAction::Add { after } => Edit::AddBranch { after },
        BranchAction::Move { index, delta } => Edit::MoveBranch { index, delta },
        BranchAction::Delete { index } => Edit::DeleteBranch { index },
        BranchAction::Title { index, title } => Edit::SetBranchTitle { index, title },
    };
    super::edit(opts, "branch", |_| Ok(edit))
}
