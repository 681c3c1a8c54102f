//! Structural edit operations.
//!
//! Every operation either succeeds completely or returns an error leaving the
//! chapter untouched. Operations that would break a document invariant fail
//! with [`QwError::NotPermitted`]; deletions that leave dangling references
//! repair them instead of failing.

mod branch;
mod choice;
mod repair;
mod rule;
mod segment;
mod variable;

pub use repair::CascadeReport;

use crate::chapter::{Chapter, ChoicePath, Goto, SegmentPath};
use crate::defaults::Factory;
use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::rule::{Comparator, OperationKind};
use crate::value::{TypedValue, ValueKind};

/// A single edit to a chapter, as issued by a collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Change the chapter title.
    SetChapterTitle {
        /// New title.
        title: String,
    },
    /// Insert a branch after `after`, or just before `@endings`.
    AddBranch {
        /// Index of the branch to insert after.
        after: Option<usize>,
    },
    /// Swap a branch with its neighbour `delta` places away.
    MoveBranch {
        /// Branch index.
        index: usize,
        /// Signed offset.
        delta: isize,
    },
    /// Delete a branch and repair gotos into it.
    DeleteBranch {
        /// Branch index.
        index: usize,
    },
    /// Change a branch title.
    SetBranchTitle {
        /// Branch index.
        index: usize,
        /// New title.
        title: String,
    },
    /// Insert a segment (an ending, in `@endings`).
    AddSegment {
        /// Branch index.
        branch: usize,
        /// Index of the segment to insert after; appends when absent.
        after: Option<usize>,
    },
    /// Swap a segment with its neighbour within the branch.
    MoveSegment {
        /// The segment.
        at: SegmentPath,
        /// Signed offset.
        delta: isize,
    },
    /// Delete a segment and repair gotos into it.
    DeleteSegment {
        /// The segment.
        at: SegmentPath,
    },
    /// Change a segment's text.
    SetSegmentText {
        /// The segment.
        at: SegmentPath,
        /// New text.
        text: String,
    },
    /// Set or clear a segment's illustration URL.
    SetSegmentImage {
        /// The segment.
        at: SegmentPath,
        /// New URL, `None` to remove.
        url: Option<String>,
    },
    /// Insert a choice into a segment.
    AddChoice {
        /// The segment.
        at: SegmentPath,
        /// Index of the choice to insert after; appends when absent.
        after: Option<usize>,
    },
    /// Swap a choice with its neighbour within the segment.
    MoveChoice {
        /// The choice.
        at: ChoicePath,
        /// Signed offset.
        delta: isize,
    },
    /// Delete a choice.
    DeleteChoice {
        /// The choice.
        at: ChoicePath,
    },
    /// Change a choice's text.
    SetChoiceText {
        /// The choice.
        at: ChoicePath,
        /// New text.
        text: String,
    },
    /// Point a choice at another branch/segment.
    RetargetChoice {
        /// The choice.
        at: ChoicePath,
        /// Target branch index.
        branch: usize,
        /// Target segment index; the branch's first segment when absent.
        segment: Option<usize>,
    },
    /// Insert a default condition on `variable`.
    AddCondition {
        /// The choice.
        at: ChoicePath,
        /// Index of the condition to insert after; appends when absent.
        after: Option<usize>,
        /// The variable to test.
        variable: Id,
    },
    /// Swap a condition with its neighbour.
    MoveCondition {
        /// The choice.
        at: ChoicePath,
        /// Condition index.
        index: usize,
        /// Signed offset.
        delta: isize,
    },
    /// Delete a condition.
    DeleteCondition {
        /// The choice.
        at: ChoicePath,
        /// Condition index.
        index: usize,
    },
    /// Point a condition at another variable.
    SetConditionVariable {
        /// The choice.
        at: ChoicePath,
        /// Condition index.
        index: usize,
        /// The new variable.
        variable: Id,
    },
    /// Change a condition's comparator.
    SetConditionComparator {
        /// The choice.
        at: ChoicePath,
        /// Condition index.
        index: usize,
        /// The new comparator.
        comparator: Comparator,
    },
    /// Compare a condition against a new constant.
    SetConditionValue {
        /// The choice.
        at: ChoicePath,
        /// Condition index.
        index: usize,
        /// The new constant.
        value: TypedValue,
    },
    /// Insert a default operation on `variable`.
    AddOperation {
        /// The choice.
        at: ChoicePath,
        /// Index of the operation to insert after; appends when absent.
        after: Option<usize>,
        /// The variable to mutate.
        variable: Id,
    },
    /// Swap an operation with its neighbour.
    MoveOperation {
        /// The choice.
        at: ChoicePath,
        /// Operation index.
        index: usize,
        /// Signed offset.
        delta: isize,
    },
    /// Delete an operation.
    DeleteOperation {
        /// The choice.
        at: ChoicePath,
        /// Operation index.
        index: usize,
    },
    /// Point an operation at another variable.
    SetOperationVariable {
        /// The choice.
        at: ChoicePath,
        /// Operation index.
        index: usize,
        /// The new variable.
        variable: Id,
    },
    /// Change an operation's kind.
    SetOperationKind {
        /// The choice.
        at: ChoicePath,
        /// Operation index.
        index: usize,
        /// The new kind.
        kind: OperationKind,
    },
    /// Change an operation's operand.
    SetOperationValue {
        /// The choice.
        at: ChoicePath,
        /// Operation index.
        index: usize,
        /// The new operand.
        value: TypedValue,
    },
    /// Insert a variable of the given type.
    AddVariable {
        /// Variable type.
        kind: ValueKind,
        /// Index of the variable to insert after; appends when absent.
        after: Option<usize>,
    },
    /// Swap a variable with its neighbour.
    MoveVariable {
        /// Variable index.
        index: usize,
        /// Signed offset.
        delta: isize,
    },
    /// Delete a variable and every condition/operation using it.
    DeleteVariable {
        /// The variable.
        id: Id,
    },
    /// Rename a variable.
    RenameVariable {
        /// The variable.
        id: Id,
        /// New name.
        name: String,
    },
    /// Change a variable's initial value.
    SetVariableInitialValue {
        /// The variable.
        id: Id,
        /// New initial value, of the variable's type.
        value: TypedValue,
    },
}

impl Edit {
    /// Whether the edit removes something and should be confirmed first.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::DeleteBranch { .. }
                | Self::DeleteSegment { .. }
                | Self::DeleteChoice { .. }
                | Self::DeleteCondition { .. }
                | Self::DeleteOperation { .. }
                | Self::DeleteVariable { .. }
        )
    }

    /// Whether views listing variables or their uses must refresh afterwards.
    pub fn refreshes_dependents(&self) -> bool {
        matches!(
            self,
            Self::AddVariable { .. }
                | Self::MoveVariable { .. }
                | Self::DeleteVariable { .. }
                | Self::RenameVariable { .. }
                | Self::SetConditionVariable { .. }
                | Self::SetOperationVariable { .. }
        )
    }
}

/// What a successful edit did.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Something was inserted at this index.
    Inserted(usize),
    /// Something moved to this index.
    Moved(usize),
    /// Something was removed.
    Removed,
    /// A variable was removed along with its uses.
    VariableRemoved(CascadeReport),
    /// A choice now leads here.
    Retargeted(Goto),
    /// A field was changed in place.
    Updated,
    /// The confirmation prompt was declined; nothing changed.
    Declined,
}

impl Chapter {
    /// Apply an edit.
    pub fn apply(&mut self, edit: &Edit, factory: &mut Factory) -> QwResult<EditOutcome> {
        use EditOutcome::{Inserted, Moved, Removed, Retargeted, Updated, VariableRemoved};

        Ok(match edit {
            Edit::SetChapterTitle { title } => {
                self.title.clone_from(title);
                Updated
            }
            Edit::AddBranch { after } => Inserted(self.add_branch(*after, factory)?),
            Edit::MoveBranch { index, delta } => Moved(self.move_branch(*index, *delta)?),
            Edit::DeleteBranch { index } => {
                self.delete_branch(*index)?;
                Removed
            }
            Edit::SetBranchTitle { index, title } => {
                self.set_branch_title(*index, title.clone())?;
                Updated
            }
            Edit::AddSegment { branch, after } => {
                Inserted(self.add_segment(*branch, *after, factory)?)
            }
            Edit::MoveSegment { at, delta } => Moved(self.move_segment(*at, *delta)?),
            Edit::DeleteSegment { at } => {
                self.delete_segment(*at)?;
                Removed
            }
            Edit::SetSegmentText { at, text } => {
                self.set_segment_text(*at, text.clone())?;
                Updated
            }
            Edit::SetSegmentImage { at, url } => {
                self.set_segment_image(*at, url.clone())?;
                Updated
            }
            Edit::AddChoice { at, after } => Inserted(self.add_choice(*at, *after, factory)?),
            Edit::MoveChoice { at, delta } => Moved(self.move_choice(*at, *delta)?),
            Edit::DeleteChoice { at } => {
                self.delete_choice(*at)?;
                Removed
            }
            Edit::SetChoiceText { at, text } => {
                self.set_choice_text(*at, text.clone())?;
                Updated
            }
            Edit::RetargetChoice {
                at,
                branch,
                segment,
            } => Retargeted(self.retarget_choice(*at, *branch, *segment)?),
            Edit::AddCondition {
                at,
                after,
                variable,
            } => Inserted(self.add_condition(*at, *after, variable)?),
            Edit::MoveCondition { at, index, delta } => {
                Moved(self.move_condition(*at, *index, *delta)?)
            }
            Edit::DeleteCondition { at, index } => {
                self.delete_condition(*at, *index)?;
                Removed
            }
            Edit::SetConditionVariable {
                at,
                index,
                variable,
            } => {
                self.set_condition_variable(*at, *index, variable)?;
                Updated
            }
            Edit::SetConditionComparator {
                at,
                index,
                comparator,
            } => {
                self.set_condition_comparator(*at, *index, *comparator)?;
                Updated
            }
            Edit::SetConditionValue { at, index, value } => {
                self.set_condition_value(*at, *index, *value)?;
                Updated
            }
            Edit::AddOperation {
                at,
                after,
                variable,
            } => Inserted(self.add_operation(*at, *after, variable)?),
            Edit::MoveOperation { at, index, delta } => {
                Moved(self.move_operation(*at, *index, *delta)?)
            }
            Edit::DeleteOperation { at, index } => {
                self.delete_operation(*at, *index)?;
                Removed
            }
            Edit::SetOperationVariable {
                at,
                index,
                variable,
            } => {
                self.set_operation_variable(*at, *index, variable)?;
                Updated
            }
            Edit::SetOperationKind { at, index, kind } => {
                self.set_operation_kind(*at, *index, *kind)?;
                Updated
            }
            Edit::SetOperationValue { at, index, value } => {
                self.set_operation_value(*at, *index, *value)?;
                Updated
            }
            Edit::AddVariable { kind, after } => {
                Inserted(self.add_variable(*kind, *after, factory)?)
            }
            Edit::MoveVariable { index, delta } => Moved(self.move_variable(*index, *delta)?),
            Edit::DeleteVariable { id } => VariableRemoved(self.delete_variable(id)?.1),
            Edit::RenameVariable { id, name } => {
                self.rename_variable(id, name.clone())?;
                Updated
            }
            Edit::SetVariableInitialValue { id, value } => {
                self.set_variable_initial_value(id, *value)?;
                Updated
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Shared list helpers
// ---------------------------------------------------------------------------

pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> QwResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(QwError::IndexOutOfRange { what, index, len })
    }
}

/// Insertion point for "after the selected element, or append".
pub(crate) fn insert_position(
    what: &'static str,
    after: Option<usize>,
    len: usize,
) -> QwResult<usize> {
    match after {
        Some(index) => {
            check_index(what, index, len)?;
            Ok(index + 1)
        }
        None => Ok(len),
    }
}

/// Target index of a move within `0..bound`, or `NotPermitted` at the boundaries.
pub(crate) fn move_target(
    what: &'static str,
    index: usize,
    delta: isize,
    bound: usize,
) -> QwResult<usize> {
    index
        .checked_add_signed(delta)
        .filter(|target| *target < bound)
        .ok_or_else(|| QwError::not_permitted(format!("cannot move {what} {index} by {delta}")))
}

/// Swap `list[index]` with `list[index + delta]`, returning the new index.
pub(crate) fn shift<T>(
    list: &mut [T],
    what: &'static str,
    index: usize,
    delta: isize,
) -> QwResult<usize> {
    check_index(what, index, list.len())?;
    let target = move_target(what, index, delta, list.len())?;
    list.swap(index, target);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_position_after_or_append() {
        assert_eq!(insert_position("x", Some(0), 2).unwrap(), 1);
        assert_eq!(insert_position("x", None, 2).unwrap(), 2);
        assert!(insert_position("x", Some(2), 2).is_err());
    }

    #[test]
    fn shift_blocked_at_boundaries() {
        let mut list = vec!['a', 'b', 'c'];
        assert_eq!(shift(&mut list, "x", 0, 1).unwrap(), 1);
        assert_eq!(list, vec!['b', 'a', 'c']);
        assert!(shift(&mut list, "x", 0, -1).unwrap_err().is_not_permitted());
        assert!(shift(&mut list, "x", 2, 1).unwrap_err().is_not_permitted());
        assert!(matches!(
            shift(&mut list, "x", 5, 1),
            Err(QwError::IndexOutOfRange { .. })
        ));
        assert_eq!(list, vec!['b', 'a', 'c']);
    }

    #[test]
    fn destructive_edits() {
        assert!(Edit::DeleteBranch { index: 0 }.is_destructive());
        assert!(Edit::DeleteVariable { id: Id::new("v") }.is_destructive());
        assert!(!Edit::AddBranch { after: None }.is_destructive());
    }

    #[test]
    fn apply_dispatches() {
        let mut factory = Factory::sequential();
        let mut chapter = factory.chapter();

        let outcome = chapter
            .apply(&Edit::AddBranch { after: Some(0) }, &mut factory)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Inserted(1));

        let outcome = chapter
            .apply(
                &Edit::SetChapterTitle {
                    title: "Prologue".to_string(),
                },
                &mut factory,
            )
            .unwrap();
        assert_eq!(outcome, EditOutcome::Updated);
        assert_eq!(chapter.title, "Prologue");
    }
}
