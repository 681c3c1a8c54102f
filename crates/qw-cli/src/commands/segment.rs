use clap::Subcommand;
use qw_core::{Edit, SegmentPath};

use super::{Options, parse_segment_path};

#[derive(Subcommand)]
pub enum SegmentAction {
    /// Add a segment to a branch (an ending when the branch is @endings)
    Add {
        /// Branch index
        branch: usize,

        /// Insert after this segment (default: at the end)
        #[arg(long)]
        after: Option<usize>,
    },

    /// Move a segment within its branch
    Move {
        /// Segment as BRANCH.SEGMENT
        #[arg(value_parser = parse_segment_path)]
        at: SegmentPath,

        /// Signed offset
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },

    /// Delete a segment; options leading into it are redirected
    Delete {
        /// Segment as BRANCH.SEGMENT
        #[arg(value_parser = parse_segment_path)]
        at: SegmentPath,
    },

    /// Replace a segment's text
    Text {
        /// Segment as BRANCH.SEGMENT
        #[arg(value_parser = parse_segment_path)]
        at: SegmentPath,

        /// New text
        text: String,
    },

    /// Set a segment's illustration URL, or clear it when omitted
    Image {
        /// Segment as BRANCH.SEGMENT
        #[arg(value_parser = parse_segment_path)]
        at: SegmentPath,

        /// Image URL
        url: Option<String>,
    },
}

pub fn run(opts: &Options, action: SegmentAction) -> Result<(), String> {
    let edit = match action {
        SegmentAction::Add { branch, after } => Edit::AddSegment { branch, after },
        SegmentAction::Move { at, delta } => Edit::MoveSegment { at, delta },
        SegmentAction::Delete { at } => Edit::DeleteSegment { at },
        SegmentAction::Text { at, text } => Edit::SetSegmentText { at, text },
        SegmentAction::Image { at, url } => Edit::SetSegmentImage { at, url },
    };
    super::edit(opts, "segment", |_| Ok(edit))
}
