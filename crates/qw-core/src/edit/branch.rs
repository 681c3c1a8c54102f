use tracing::debug;

use super::repair::Removal;
use super::{check_index, move_target};
use crate::chapter::{Branch, Chapter};
use crate::defaults::Factory;
use crate::error::{QwError, QwResult};

impl Chapter {
    /// Insert a new branch and return its index.
    ///
    /// The branch goes after `after`, or just before `@endings` when no branch
    /// is given. It never lands after `@endings`. Its segment's single choice
    /// leads to the default goto target.
    pub fn add_branch(&mut self, after: Option<usize>, factory: &mut Factory) -> QwResult<usize> {
        let endings = self.endings_index()?;
        let position = match after {
            Some(index) => {
                check_index("branch", index, self.branches.len())?;
                (index + 1).min(endings)
            }
            None => endings,
        };
        let goto = self.default_goto()?;
        let id = factory.fresh_id(self);
        let segment_id = factory.fresh_id(self);
        debug!(%id, position, "adding branch");
        self.branches
            .insert(position, factory.branch(id, segment_id, goto));
        Ok(position)
    }

    /// Swap an ordinary branch with its neighbour, returning the new index.
    ///
    /// Ordinary branches reorder only among themselves: nothing moves across
    /// or past `@endings`.
    pub fn move_branch(&mut self, index: usize, delta: isize) -> QwResult<usize> {
        check_index("branch", index, self.branches.len())?;
        let endings = self.endings_index()?;
        if self.branches[index].id.is_reserved() || index > endings {
            return Err(QwError::not_permitted(format!(
                "branch {} cannot be moved",
                self.branches[index].id
            )));
        }
        let target = move_target("branch", index, delta, endings)?;
        self.branches.swap(index, target);
        Ok(target)
    }

    /// Remove a branch, redirecting every goto into it to the default target.
    pub fn delete_branch(&mut self, index: usize) -> QwResult<Branch> {
        let branch = self.branch_at(index)?;
        if branch.id.is_reserved() {
            return Err(QwError::not_permitted(format!(
                "branch {} cannot be deleted",
                branch.id
            )));
        }
        let target = self.repair_target(Removal::Branch(index))?;
        let removed = self.branches.remove(index);
        let repaired = self.repair_gotos(&target, |g| g.branch_id == removed.id);
        debug!(id = %removed.id, repaired, %target, "deleted branch");
        Ok(removed)
    }

    /// Change a branch's title. The reserved branch keeps its title.
    pub fn set_branch_title(&mut self, index: usize, title: impl Into<String>) -> QwResult<()> {
        let branch = self.branch_at_mut(index)?;
        if branch.id.is_reserved() {
            return Err(QwError::not_permitted(format!(
                "branch {} cannot be renamed",
                branch.id
            )));
        }
        branch.title = title.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::chapter::{Goto, SegmentPath};
    use crate::defaults::Factory;
    use crate::error::QwError;
    use crate::id::Id;

    #[test]
    fn add_branch_lands_before_endings() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        assert_eq!(c.add_branch(None, &mut factory).unwrap(), 1);
        assert!(c.branches[2].is_endings());

        // "after @endings" is clamped.
        assert_eq!(c.add_branch(Some(2), &mut factory).unwrap(), 2);
        assert!(c.branches.last().unwrap().is_endings());
        assert_eq!(c.branches.len(), 4);
    }

    #[test]
    fn new_branch_choice_targets_default() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        let default = c.default_goto().unwrap();
        let i = c.add_branch(Some(0), &mut factory).unwrap();
        let choice = &c.branches[i].segments[0].choices()[0];
        assert_eq!(choice.goto, default);
        assert!(!c.branches[i].id.is_reserved());
    }

    #[test]
    fn move_branch_stays_before_endings() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        c.add_branch(None, &mut factory).unwrap();
        let first = c.branches[0].id.clone();
        assert_eq!(c.move_branch(0, 1).unwrap(), 1);
        assert_eq!(c.branches[1].id, first);

        assert!(c.move_branch(1, 1).unwrap_err().is_not_permitted());
        assert!(c.move_branch(2, -1).unwrap_err().is_not_permitted());
        assert!(c.move_branch(0, -1).unwrap_err().is_not_permitted());
    }

    #[test]
    fn delete_endings_rejected() {
        let mut c = Factory::sequential().chapter();
        let before = c.clone();
        assert!(c.delete_branch(1).unwrap_err().is_not_permitted());
        assert_eq!(c, before);
    }

    #[test]
    fn delete_branch_repairs_gotos() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        let added = c.add_branch(None, &mut factory).unwrap();
        // Point the first branch's choice into the new branch.
        let target = c.branches[added].id.clone();
        let target_seg = c.branches[added].segments[0].id.clone();
        c.retarget_choice(SegmentPath::new(0, 0).choice(0), added, None)
            .unwrap();
        assert_eq!(
            c.choice(SegmentPath::new(0, 0).choice(0)).unwrap().goto,
            Goto::new(target.clone(), target_seg)
        );

        let removed = c.delete_branch(added).unwrap();
        assert_eq!(removed.id, target);
        let goto = &c.choice(SegmentPath::new(0, 0).choice(0)).unwrap().goto;
        assert_eq!(*goto, c.default_goto().unwrap());
    }

    #[test]
    fn delete_first_branch_repairs_to_new_first() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        c.add_branch(None, &mut factory).unwrap();
        c.delete_branch(0).unwrap();
        assert!(c.choices().all(|(_, ch)| c.resolves(&ch.goto)));
        assert_eq!(
            c.choices().next().unwrap().1.goto,
            c.default_goto().unwrap()
        );
    }

    #[test]
    fn reserved_title_locked() {
        let mut c = Factory::sequential().chapter();
        assert!(c.set_branch_title(1, "x").unwrap_err().is_not_permitted());
        c.set_branch_title(0, "Forest").unwrap();
        assert_eq!(c.branches[0].title, "Forest");
        assert!(matches!(
            c.set_branch_title(7, "x"),
            Err(QwError::IndexOutOfRange { .. })
        ));
        assert_eq!(c.branches[1].id, Id::endings());
    }
}
