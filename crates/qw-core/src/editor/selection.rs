//! What the user is currently looking at.

use crate::chapter::{Chapter, ChoicePath, SegmentPath};
use crate::id::Id;

/// The current branch, segment and choice.
///
/// Branch and segment are held by id so that reordering does not change what
/// is selected. Each level is only meaningful when the level above is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorSelection {
    /// Selected branch.
    pub branch: Option<Id>,
    /// Selected segment, a member of `branch`.
    pub segment: Option<Id>,
    /// Selected choice index within `segment`.
    pub choice: Option<usize>,
}

impl EditorSelection {
    /// Index of the selected branch, if it still exists.
    pub fn branch_index(&self, chapter: &Chapter) -> Option<usize> {
        chapter.branch_index(self.branch.as_ref()?)
    }

    /// Position of the selected segment, if it still exists.
    pub fn segment_path(&self, chapter: &Chapter) -> Option<SegmentPath> {
        let branch = self.branch_index(chapter)?;
        let segment = chapter.branches[branch].segment_index(self.segment.as_ref()?)?;
        Some(SegmentPath::new(branch, segment))
    }

    /// Position of the selected choice, if it still exists.
    pub fn choice_path(&self, chapter: &Chapter) -> Option<ChoicePath> {
        let at = self.segment_path(chapter)?;
        let choice = self.choice?;
        let len = chapter.segment(at).ok()?.choices().len();
        (choice < len).then_some(at.choice(choice))
    }

    /// Clear whatever no longer resolves. Returns whether anything changed.
    pub fn repair(&mut self, chapter: &Chapter) -> bool {
        let before = self.clone();
        if self.branch.is_some() && self.branch_index(chapter).is_none() {
            self.branch = None;
        }
        if self.branch.is_none() {
            self.segment = None;
        }
        if self.segment.is_some() && self.segment_path(chapter).is_none() {
            self.segment = None;
        }
        if self.segment.is_none() {
            self.choice = None;
        }
        if self.choice.is_some() && self.choice_path(chapter).is_none() {
            self.choice = None;
        }
        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::Factory;

    fn selected(c: &Chapter) -> EditorSelection {
        EditorSelection {
            branch: Some(c.branches[0].id.clone()),
            segment: Some(c.branches[0].segments[0].id.clone()),
            choice: Some(0),
        }
    }

    #[test]
    fn resolves_positions() {
        let c = Factory::sequential().chapter();
        let sel = selected(&c);
        assert_eq!(sel.branch_index(&c), Some(0));
        assert_eq!(sel.choice_path(&c), Some(ChoicePath::new(0, 0, 0)));
    }

    #[test]
    fn repair_clears_dangling_levels() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        let mut sel = selected(&c);
        assert!(!sel.repair(&c));

        sel.choice = Some(3);
        assert!(sel.repair(&c));
        assert_eq!(sel.choice, None);
        assert!(sel.segment.is_some());

        c.add_branch(None, &mut factory).unwrap();
        let mut sel = EditorSelection {
            branch: Some(c.branches[1].id.clone()),
            segment: Some(c.branches[1].segments[0].id.clone()),
            choice: Some(0),
        };
        c.delete_branch(1).unwrap();
        assert!(sel.repair(&c));
        assert_eq!(sel, EditorSelection::default());
    }

    #[test]
    fn segment_must_belong_to_branch() {
        let c = Factory::sequential().chapter();
        let mut sel = EditorSelection {
            branch: Some(c.branches[0].id.clone()),
            segment: Some(c.branches[1].segments[0].id.clone()),
            choice: None,
        };
        assert!(sel.repair(&c));
        assert_eq!(sel.segment, None);
        assert!(sel.branch.is_some());
    }
}
