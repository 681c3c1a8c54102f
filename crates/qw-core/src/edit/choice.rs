use tracing::debug;

use super::{check_index, insert_position, shift};
use crate::chapter::{Chapter, Choice, ChoicePath, Goto, SegmentPath};
use crate::defaults::Factory;
use crate::error::{QwError, QwResult};

impl Chapter {
    /// Insert a default choice into an ordinary segment and return its index.
    ///
    /// The choice leads to the default goto target.
    pub fn add_choice(
        &mut self,
        at: SegmentPath,
        after: Option<usize>,
        factory: &Factory,
    ) -> QwResult<usize> {
        let segment = self.segment(at)?;
        if self.branches[at.branch].is_endings() || segment.options.is_none() {
            return Err(QwError::not_permitted(format!(
                "ending {} cannot have options",
                segment.id
            )));
        }
        let position = insert_position("option", after, segment.choices().len())?;
        let choice = factory.choice(self.default_goto()?);
        self.segment_mut(at)?
            .options
            .get_or_insert_with(Vec::new)
            .insert(position, choice);
        debug!(branch = at.branch, segment = at.segment, position, "added option");
        Ok(position)
    }

    /// Swap a choice with its neighbour within the segment.
    pub fn move_choice(&mut self, at: ChoicePath, delta: isize) -> QwResult<usize> {
        self.choice(at)?;
        let choices = self
            .segment_mut(at.segment_path())?
            .options
            .get_or_insert_with(Vec::new);
        shift(choices, "option", at.choice, delta)
    }

    /// Remove a choice. A segment keeps at least one.
    pub fn delete_choice(&mut self, at: ChoicePath) -> QwResult<Choice> {
        let len = self.segment(at.segment_path())?.choices().len();
        check_index("option", at.choice, len)?;
        if len == 1 {
            return Err(QwError::not_permitted(
                "a segment needs at least one option",
            ));
        }
        let choices = self
            .segment_mut(at.segment_path())?
            .options
            .get_or_insert_with(Vec::new);
        Ok(choices.remove(at.choice))
    }

    /// Replace a choice's text.
    pub fn set_choice_text(&mut self, at: ChoicePath, text: impl Into<String>) -> QwResult<()> {
        self.choice_mut(at)?.text = text.into();
        Ok(())
    }

    /// Point a choice at a segment of any branch.
    ///
    /// Without a segment the branch's first segment is used. Returns the new
    /// goto.
    pub fn retarget_choice(
        &mut self,
        at: ChoicePath,
        branch: usize,
        segment: Option<usize>,
    ) -> QwResult<Goto> {
        self.choice(at)?;
        let target = self.segment(SegmentPath::new(branch, segment.unwrap_or(0)))?;
        let goto = Goto::new(self.branches[branch].id.clone(), target.id.clone());
        self.choice_mut(at)?.goto = goto.clone();
        debug!(%goto, "retargeted option");
        Ok(goto)
    }
}

#[cfg(test)]
mod tests {
    use crate::chapter::{ChoicePath, SegmentPath};
    use crate::defaults::Factory;
    use crate::error::QwError;

    #[test]
    fn add_choice_to_ending_rejected() {
        let factory = Factory::sequential();
        let mut c = Factory::sequential().chapter();
        let before = c.clone();
        assert!(c
            .add_choice(SegmentPath::new(1, 0), None, &factory)
            .unwrap_err()
            .is_not_permitted());
        assert_eq!(c, before);
    }

    #[test]
    fn add_choice_after_selected() {
        let factory = Factory::sequential();
        let mut c = Factory::sequential().chapter();
        let at = SegmentPath::new(0, 0);
        c.set_choice_text(at.choice(0), "first").unwrap();
        assert_eq!(c.add_choice(at, None, &factory).unwrap(), 1);
        assert_eq!(c.add_choice(at, Some(0), &factory).unwrap(), 1);
        let texts: Vec<_> = c.segment(at).unwrap().choices().iter().map(|ch| ch.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "New option", "New option"]);
    }

    #[test]
    fn last_choice_cannot_be_deleted() {
        let factory = Factory::sequential();
        let mut c = Factory::sequential().chapter();
        let at = ChoicePath::new(0, 0, 0);
        assert!(c.delete_choice(at).unwrap_err().is_not_permitted());
        c.add_choice(at.segment_path(), None, &factory).unwrap();
        c.delete_choice(at).unwrap();
        assert_eq!(c.segment(at.segment_path()).unwrap().choices().len(), 1);
        assert!(matches!(
            c.delete_choice(ChoicePath::new(0, 0, 4)),
            Err(QwError::IndexOutOfRange { what: "option", .. })
        ));
    }

    #[test]
    fn move_choice_swaps() {
        let factory = Factory::sequential();
        let mut c = Factory::sequential().chapter();
        let at = SegmentPath::new(0, 0);
        c.add_choice(at, None, &factory).unwrap();
        c.set_choice_text(at.choice(1), "second").unwrap();
        assert_eq!(c.move_choice(at.choice(1), -1).unwrap(), 0);
        assert_eq!(c.choice(at.choice(0)).unwrap().text, "second");
        assert!(c.move_choice(at.choice(0), -1).unwrap_err().is_not_permitted());
    }

    #[test]
    fn retarget_to_branch_start_or_segment() {
        let mut c = Factory::sequential().chapter();
        let at = ChoicePath::new(0, 0, 0);
        let goto = c.retarget_choice(at, 1, None).unwrap();
        assert!(goto.branch_id.is_endings());
        assert_eq!(goto.segment_id, c.branches[1].segments[0].id);
        assert!(c.retarget_choice(at, 1, Some(3)).is_err());
        assert!(c.retarget_choice(at, 9, None).is_err());
        assert_eq!(c.choice(at).unwrap().goto, goto);
    }
}
