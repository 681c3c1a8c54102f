use tracing::debug;

use super::repair::Removal;
use super::{insert_position, shift};
use crate::chapter::{Chapter, Segment, SegmentPath};
use crate::defaults::Factory;
use crate::error::{QwError, QwResult};

impl Chapter {
    /// Insert a segment into a branch and return its index.
    ///
    /// In `@endings` the new segment is an ending; elsewhere it gets a single
    /// choice leading to the default goto target.
    pub fn add_segment(
        &mut self,
        branch: usize,
        after: Option<usize>,
        factory: &mut Factory,
    ) -> QwResult<usize> {
        let len = self.branch_at(branch)?.segments.len();
        let position = insert_position("segment", after, len)?;
        let id = factory.fresh_id(self);
        let segment = if self.branches[branch].is_endings() {
            factory.ending(id)
        } else {
            factory.segment(id, self.default_goto()?)
        };
        debug!(id = %segment.id, branch, position, "adding segment");
        self.branches[branch].segments.insert(position, segment);
        Ok(position)
    }

    /// Swap a segment with its neighbour within the branch.
    pub fn move_segment(&mut self, at: SegmentPath, delta: isize) -> QwResult<usize> {
        let branch = self.branch_at_mut(at.branch)?;
        shift(&mut branch.segments, "segment", at.segment, delta)
    }

    /// Remove a segment, redirecting every goto into it to the default target.
    ///
    /// A branch's only segment cannot be removed.
    pub fn delete_segment(&mut self, at: SegmentPath) -> QwResult<Segment> {
        self.segment(at)?;
        let branch = &self.branches[at.branch];
        if branch.segments.len() == 1 {
            return Err(QwError::not_permitted(format!(
                "segment {} is the only one in branch {}",
                branch.segments[0].id, branch.id
            )));
        }
        let target = self.repair_target(Removal::Segment(at))?;
        let removed = self.branches[at.branch].segments.remove(at.segment);
        let repaired = self.repair_gotos(&target, |g| g.segment_id == removed.id);
        debug!(id = %removed.id, repaired, %target, "deleted segment");
        Ok(removed)
    }

    /// Replace a segment's prose.
    pub fn set_segment_text(&mut self, at: SegmentPath, text: impl Into<String>) -> QwResult<()> {
        self.segment_mut(at)?.text = text.into();
        Ok(())
    }

    /// Set or clear a segment's illustration. An empty URL clears it.
    pub fn set_segment_image(&mut self, at: SegmentPath, url: Option<String>) -> QwResult<()> {
        self.segment_mut(at)?.image_url = url.filter(|u| !u.is_empty());
        Ok(())
    }
}
