//! Read-only queries for building pickers and enabling actions.

use crate::chapter::{Branch, Chapter, ChoicePath, SegmentPath};
use crate::edit::move_target;
use crate::error::QwResult;
use crate::id::Id;
use crate::value::ValueKind;

/// Longest segment excerpt shown in a picker, in characters.
pub const LABEL_WIDTH: usize = 80;

/// Label for the segment a choice belongs to.
pub const THIS_SEGMENT: &str = "(this segment)";

/// One row of a picker: the id to store and the text to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    /// The entity's id.
    pub id: Id,
    /// What to display.
    pub label: String,
}

impl SelectorEntry {
    fn new(id: &Id, label: impl Into<String>) -> Self {
        Self {
            id: id.clone(),
            label: label.into(),
        }
    }
}

/// Single-line excerpt of `text`, cut to [`LABEL_WIDTH`] characters.
pub fn shorten(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= LABEL_WIDTH {
        flat
    } else {
        let mut cut: String = flat.chars().take(LABEL_WIDTH).collect();
        cut.push_str("...");
        cut
    }
}

impl Branch {
    /// Display label: the title, or the id when untitled.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}

impl Chapter {
    // -----------------------------------------------------------------------
    // Pickers
    // -----------------------------------------------------------------------

    /// Every branch, in order.
    pub fn branch_entries(&self) -> Vec<SelectorEntry> {
        self.branches
            .iter()
            .map(|b| SelectorEntry::new(&b.id, b.label()))
            .collect()
    }

    /// Segments of a branch, as goto targets for the choice at `from`.
    ///
    /// The choice's own segment is labelled [`THIS_SEGMENT`].
    pub fn segment_entries(
        &self,
        branch: usize,
        from: Option<ChoicePath>,
    ) -> QwResult<Vec<SelectorEntry>> {
        let own = from.map(ChoicePath::segment_path);
        Ok(self
            .branch_at(branch)?
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if own == Some(SegmentPath::new(branch, i)) {
                    SelectorEntry::new(&s.id, THIS_SEGMENT)
                } else {
                    SelectorEntry::new(&s.id, shorten(&s.text))
                }
            })
            .collect())
    }

    /// Variables, optionally only those of one type.
    pub fn variable_entries(&self, kind: Option<ValueKind>) -> Vec<SelectorEntry> {
        self.variables
            .iter()
            .filter(|v| kind.is_none_or(|k| v.kind() == k))
            .map(|v| SelectorEntry::new(&v.id, v.name.as_str()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    /// Whether [`Chapter::delete_branch`] would succeed.
    pub fn can_delete_branch(&self, index: usize) -> bool {
        self.branch_at(index).is_ok_and(|b| !b.id.is_reserved())
    }

    /// Whether [`Chapter::move_branch`] would succeed.
    pub fn can_move_branch(&self, index: usize, delta: isize) -> bool {
        let Ok(endings) = self.endings_index() else {
            return false;
        };
        index < endings
            && !self.branches[index].id.is_reserved()
            && move_target("branch", index, delta, endings).is_ok()
    }

    /// Whether [`Chapter::delete_segment`] would succeed.
    pub fn can_delete_segment(&self, at: SegmentPath) -> bool {
        self.segment(at).is_ok() && self.branches[at.branch].segments.len() > 1
    }

    /// Whether [`Chapter::move_segment`] would succeed.
    pub fn can_move_segment(&self, at: SegmentPath, delta: isize) -> bool {
        self.branch_at(at.branch).is_ok_and(|b| {
            at.segment < b.segments.len()
                && move_target("segment", at.segment, delta, b.segments.len()).is_ok()
        })
    }

    /// Whether [`Chapter::add_choice`] would succeed.
    pub fn can_add_choice(&self, at: SegmentPath) -> bool {
        self.segment(at)
            .is_ok_and(|s| s.options.is_some() && !self.branches[at.branch].is_endings())
    }

    /// Whether [`Chapter::delete_choice`] would succeed.
    pub fn can_delete_choice(&self, at: ChoicePath) -> bool {
        self.choice(at).is_ok()
            && self
                .segment(at.segment_path())
                .is_ok_and(|s| s.choices().len() > 1)
    }

    /// Whether [`Chapter::move_choice`] would succeed.
    pub fn can_move_choice(&self, at: ChoicePath, delta: isize) -> bool {
        self.segment(at.segment_path()).is_ok_and(|s| {
            let len = s.choices().len();
            at.choice < len && move_target("option", at.choice, delta, len).is_ok()
        })
    }

    /// Whether [`Chapter::move_variable`] would succeed.
    pub fn can_move_variable(&self, index: usize, delta: isize) -> bool {
        let len = self.variables.len();
        index < len && move_target("variable", index, delta, len).is_ok()
    }
}
