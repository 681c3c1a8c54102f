//! Reference repair after deletions.

use crate::chapter::{Chapter, Goto, SegmentPath};
use crate::error::{QwError, QwResult};
use crate::id::Id;

/// What removing a variable took with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Conditions that tested the variable, on either side.
    pub conditions_removed: usize,
    /// Operations that mutated the variable.
    pub operations_removed: usize,
}

impl CascadeReport {
    /// Whether nothing but the variable itself was removed.
    pub fn is_empty(&self) -> bool {
        self.conditions_removed == 0 && self.operations_removed == 0
    }
}

/// The element about to be removed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Removal {
    Branch(usize),
    Segment(SegmentPath),
}

impl Chapter {
    /// The default goto as it will be once `removal` has happened.
    ///
    /// Computed up front so that a failure leaves the chapter untouched.
    pub(crate) fn repair_target(&self, removal: Removal) -> QwResult<Goto> {
        let branch_index = match removal {
            Removal::Branch(0) => 1,
            _ => 0,
        };
        let branch = self
            .branches
            .get(branch_index)
            .ok_or(QwError::MissingEndings)?;
        let segment_index = match removal {
            Removal::Segment(at) if at.branch == branch_index && at.segment == 0 => 1,
            _ => 0,
        };
        let segment = branch.segments.get(segment_index).ok_or_else(|| {
            QwError::not_permitted(format!("branch {} would have no segments", branch.id))
        })?;
        Ok(Goto::new(branch.id.clone(), segment.id.clone()))
    }

    /// Point every dangling goto at `target`. Returns how many were rewritten.
    pub(crate) fn repair_gotos(&mut self, target: &Goto, dangling: impl Fn(&Goto) -> bool) -> usize {
        let mut repaired = 0;
        for choice in self.choices_mut() {
            if dangling(&choice.goto) {
                choice.goto = target.clone();
                repaired += 1;
            }
        }
        repaired
    }

    /// Strip every condition and operation referencing `variable`.
    ///
    /// Endings carry no choices, so only ordinary branches are visited.
    pub(crate) fn cascade_variable(&mut self, variable: &Id) -> CascadeReport {
        let mut report = CascadeReport::default();
        for choice in self
            .branches
            .iter_mut()
            .filter(|b| !b.is_endings())
            .flat_map(|b| b.segments.iter_mut())
            .flat_map(|s| s.options.iter_mut().flatten())
        {
            let before = choice.conditions.len();
            choice.conditions.retain(|c| !c.references(variable));
            report.conditions_removed += before - choice.conditions.len();

            let before = choice.operations.len();
            choice.operations.retain(|o| o.variable_id != *variable);
            report.operations_removed += before - choice.operations.len();
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::Factory;

    #[test]
    fn target_skips_removed_first_branch() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        c.add_branch(None, &mut factory).unwrap();
        let goto = c.repair_target(Removal::Branch(0)).unwrap();
        assert_eq!(goto.branch_id, c.branches[1].id);
    }

    #[test]
    fn target_skips_removed_first_segment() {
        let mut factory = Factory::sequential();
        let mut c = factory.chapter();
        c.add_segment(0, None, &mut factory).unwrap();
        let goto = c.repair_target(Removal::Segment(SegmentPath::new(0, 0))).unwrap();
        assert_eq!(goto.segment_id, c.branches[0].segments[1].id);
        let goto = c.repair_target(Removal::Segment(SegmentPath::new(0, 1))).unwrap();
        assert_eq!(goto.segment_id, c.branches[0].segments[0].id);
    }

    #[test]
    fn repair_counts_rewrites() {
        let mut c = Factory::sequential().chapter();
        let target = Goto::new(Id::new("b"), Id::new("s"));
        assert_eq!(c.repair_gotos(&target, |_| true), 1);
        assert_eq!(c.branches[0].segments[0].choices()[0].goto, target);
    }
}
