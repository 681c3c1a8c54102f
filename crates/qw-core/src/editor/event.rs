//! Notifications sent to editor subscribers.

use super::selection::EditorSelection;

/// Something observers of an editor may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The chapter now differs from the stored document.
    BecameDirty,
    /// The chapter was written and matches the stored document.
    BecameClean,
    /// The current branch, segment or choice changed.
    SelectionChanged(EditorSelection),
    /// Variables or their uses changed; lists built from them are stale.
    RefreshDependents,
}

/// Whether the chapter has unsaved edits.
///
/// Only actual transitions produce an event, so subscribers see one
/// `BecameDirty` per run of edits and one `BecameClean` per save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileState {
    dirty: bool,
}

impl FileState {
    /// Whether there are unsaved edits.
    pub fn is_dirty(self) -> bool {
        self.dirty
    }

    /// Record an edit.
    pub fn mark_dirty(&mut self) -> Option<EditorEvent> {
        (!std::mem::replace(&mut self.dirty, true)).then_some(EditorEvent::BecameDirty)
    }

    /// Record a save.
    pub fn mark_clean(&mut self) -> Option<EditorEvent> {
        std::mem::replace(&mut self.dirty, false).then_some(EditorEvent::BecameClean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_only() {
        let mut state = FileState::default();
        assert!(!state.is_dirty());
        assert_eq!(state.mark_clean(), None);
        assert_eq!(state.mark_dirty(), Some(EditorEvent::BecameDirty));
        assert_eq!(state.mark_dirty(), None);
        assert!(state.is_dirty());
        assert_eq!(state.mark_clean(), Some(EditorEvent::BecameClean));
        assert_eq!(state.mark_clean(), None);
    }
}
