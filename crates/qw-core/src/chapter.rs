//! The chapter document tree: branches, segments and choices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::rule::{Condition, Operation, VariableState};
use crate::variable::Variable;

/// Where a choice leads: a segment inside a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Goto {
    /// The target branch.
    pub branch_id: Id,
    /// The target segment, a member of `branch_id`.
    pub segment_id: Id,
}

impl Goto {
    /// Create a goto-destination.
    pub fn new(branch_id: Id, segment_id: Id) -> Self {
        Self {
            branch_id,
            segment_id,
        }
    }
}

impl fmt::Display for Goto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.branch_id, self.segment_id)
    }
}

/// A player choice attached to a segment.
///
/// Empty `conditions` means always available; empty `operations` means no
/// effect. Both are omitted from the persisted form when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the player.
    pub text: String,
    /// Where picking this choice leads.
    pub goto: Goto,
    /// Gates on availability, all of which must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Consequences, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,
}

impl Choice {
    /// Create a choice with no conditions and no operations.
    pub fn new(text: impl Into<String>, goto: Goto) -> Self {
        Self {
            text: text.into(),
            goto,
            conditions: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Whether every condition holds.
    pub fn is_available(&self, state: &VariableState) -> QwResult<bool> {
        for condition in &self.conditions {
            if !condition.evaluate(state)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Apply all operations in order.
    pub fn apply(&self, state: &mut VariableState) -> QwResult<()> {
        self.operations.iter().try_for_each(|op| op.apply(state))
    }
}

/// A narrative beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier within the chapter.
    pub id: Id,
    /// The segment's prose.
    pub text: String,
    /// Optional illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Choices offered to the player. `None` for endings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Choice>>,
}

impl Segment {
    /// Create an ordinary segment with the given choices.
    pub fn new(id: Id, text: impl Into<String>, options: Vec<Choice>) -> Self {
        Self {
            id,
            text: text.into(),
            image_url: None,
            options: Some(options),
        }
    }

    /// Create an ending: a segment without choices.
    pub fn ending(id: Id, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            image_url: None,
            options: None,
        }
    }

    /// The segment's choices, empty for endings.
    pub fn choices(&self) -> &[Choice] {
        self.options.as_deref().unwrap_or_default()
    }
}

/// A named, ordered sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Unique identifier within the chapter.
    pub id: Id,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// The branch's segments, never empty.
    pub segments: Vec<Segment>,
}

impl Branch {
    /// Create a branch.
    pub fn new(id: Id, title: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            id,
            title: title.into(),
            segments,
        }
    }

    /// Whether this is the reserved `@endings` branch.
    pub fn is_endings(&self) -> bool {
        self.id.is_endings()
    }

    /// Position of a segment in this branch.
    pub fn segment_index(&self, id: &Id) -> Option<usize> {
        self.segments.iter().position(|s| s.id == *id)
    }
}

/// Address of a segment by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentPath {
    /// Branch index within the chapter.
    pub branch: usize,
    /// Segment index within the branch.
    pub segment: usize,
}

impl SegmentPath {
    /// Create a segment path.
    pub fn new(branch: usize, segment: usize) -> Self {
        Self { branch, segment }
    }

    /// Address a choice of this segment.
    pub fn choice(self, choice: usize) -> ChoicePath {
        ChoicePath {
            branch: self.branch,
            segment: self.segment,
            choice,
        }
    }
}

impl fmt::Display for SegmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.branch, self.segment)
    }
}

/// Address of a choice by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChoicePath {
    /// Branch index within the chapter.
    pub branch: usize,
    /// Segment index within the branch.
    pub segment: usize,
    /// Choice index within the segment.
    pub choice: usize,
}

impl ChoicePath {
    /// Create a choice path.
    pub fn new(branch: usize, segment: usize, choice: usize) -> Self {
        Self {
            branch,
            segment,
            choice,
        }
    }

    /// The containing segment.
    pub fn segment_path(self) -> SegmentPath {
        SegmentPath::new(self.branch, self.segment)
    }
}

impl fmt::Display for ChoicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.branch, self.segment, self.choice)
    }
}

/// The root document.
///
/// The first branch is the default goto target for new choices and for
/// repairing dangling references; the last branch is `@endings` by
/// convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter title.
    pub title: String,
    /// Ordered branches, ending with `@endings`.
    pub branches: Vec<Branch>,
    /// Ordered story variables.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Chapter {
    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Position of a branch by id.
    pub fn branch_index(&self, id: &Id) -> Option<usize> {
        self.branches.iter().position(|b| b.id == *id)
    }

    /// Get a branch by id.
    pub fn branch(&self, id: &Id) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == *id)
    }

    /// Position of the `@endings` branch.
    pub fn endings_index(&self) -> QwResult<usize> {
        self.branches
            .iter()
            .position(Branch::is_endings)
            .ok_or(QwError::MissingEndings)
    }

    /// Find a segment anywhere in the chapter.
    pub fn find_segment(&self, id: &Id) -> Option<SegmentPath> {
        self.branches.iter().enumerate().find_map(|(b, branch)| {
            branch
                .segment_index(id)
                .map(|s| SegmentPath::new(b, s))
        })
    }

    /// Get a branch by position.
    pub fn branch_at(&self, index: usize) -> QwResult<&Branch> {
        let len = self.branches.len();
        self.branches.get(index).ok_or(QwError::IndexOutOfRange {
            what: "branch",
            index,
            len,
        })
    }

    pub(crate) fn branch_at_mut(&mut self, index: usize) -> QwResult<&mut Branch> {
        let len = self.branches.len();
        self.branches.get_mut(index).ok_or(QwError::IndexOutOfRange {
            what: "branch",
            index,
            len,
        })
    }

    /// Get a segment by position.
    pub fn segment(&self, at: SegmentPath) -> QwResult<&Segment> {
        let branch = self.branch_at(at.branch)?;
        let len = branch.segments.len();
        branch.segments.get(at.segment).ok_or(QwError::IndexOutOfRange {
            what: "segment",
            index: at.segment,
            len,
        })
    }

    pub(crate) fn segment_mut(&mut self, at: SegmentPath) -> QwResult<&mut Segment> {
        let branch = self.branch_at_mut(at.branch)?;
        let len = branch.segments.len();
        branch
            .segments
            .get_mut(at.segment)
            .ok_or(QwError::IndexOutOfRange {
                what: "segment",
                index: at.segment,
                len,
            })
    }

    /// Get a choice by position.
    pub fn choice(&self, at: ChoicePath) -> QwResult<&Choice> {
        let choices = self.segment(at.segment_path())?.choices();
        choices.get(at.choice).ok_or(QwError::IndexOutOfRange {
            what: "option",
            index: at.choice,
            len: choices.len(),
        })
    }

    pub(crate) fn choice_mut(&mut self, at: ChoicePath) -> QwResult<&mut Choice> {
        let choices = self
            .segment_mut(at.segment_path())?
            .options
            .as_mut()
            .ok_or_else(|| QwError::not_permitted("an ending has no options"))?;
        let len = choices.len();
        choices.get_mut(at.choice).ok_or(QwError::IndexOutOfRange {
            what: "option",
            index: at.choice,
            len,
        })
    }

    /// Get a variable by id.
    pub fn variable(&self, id: &Id) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == *id)
    }

    /// Position of a variable by id.
    pub fn variable_index(&self, id: &Id) -> Option<usize> {
        self.variables.iter().position(|v| v.id == *id)
    }

    /// Whether any branch, segment, or variable already uses this id.
    pub fn id_in_use(&self, id: &Id) -> bool {
        self.branches.iter().any(|b| {
            b.id == *id || b.segments.iter().any(|s| s.id == *id)
        }) || self.variables.iter().any(|v| v.id == *id)
    }

    /// The default goto target: the first segment of the first branch.
    pub fn default_goto(&self) -> QwResult<Goto> {
        let branch = self.branches.first().ok_or(QwError::MissingEndings)?;
        let segment = branch.segments.first().ok_or_else(|| {
            QwError::not_permitted(format!("branch {} has no segments", branch.id))
        })?;
        Ok(Goto::new(branch.id.clone(), segment.id.clone()))
    }

    /// Whether a goto names an existing branch and a segment in it.
    pub fn resolves(&self, goto: &Goto) -> bool {
        self.branch(&goto.branch_id)
            .is_some_and(|b| b.segment_index(&goto.segment_id).is_some())
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Every choice in document order, with its position.
    pub fn choices(&self) -> impl Iterator<Item = (ChoicePath, &Choice)> {
        self.branches.iter().enumerate().flat_map(|(b, branch)| {
            branch
                .segments
                .iter()
                .enumerate()
                .flat_map(move |(s, segment)| {
                    segment
                        .choices()
                        .iter()
                        .enumerate()
                        .map(move |(c, choice)| (ChoicePath::new(b, s, c), choice))
                })
        })
    }

    pub(crate) fn choices_mut(&mut self) -> impl Iterator<Item = &mut Choice> {
        self.branches
            .iter_mut()
            .flat_map(|b| b.segments.iter_mut())
            .flat_map(|s| s.options.iter_mut().flatten())
    }

    /// Fresh playthrough state from the variables' initial values.
    pub fn initial_state(&self) -> VariableState {
        VariableState::from_variables(&self.variables)
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Total number of segments across all branches.
    pub fn segment_count(&self) -> usize {
        self.branches.iter().map(|b| b.segments.len()).sum()
    }

    /// Total number of choices across all segments.
    pub fn choice_count(&self) -> usize {
        self.choices().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::Factory;

    fn chapter() -> Chapter {
        Factory::sequential().chapter()
    }

    #[test]
    fn lookup_by_id() {
        let c = chapter();
        assert_eq!(c.branch_index(&Id::endings()), Some(1));
        assert_eq!(c.endings_index().unwrap(), 1);
        let seg = c.branches[0].segments[0].id.clone();
        assert_eq!(c.find_segment(&seg), Some(SegmentPath::new(0, 0)));
        assert!(c.find_segment(&Id::new("nope")).is_none());
    }

    #[test]
    fn positional_access_reports_range() {
        let c = chapter();
        assert!(c.segment(SegmentPath::new(0, 0)).is_ok());
        let err = c.segment(SegmentPath::new(0, 3)).unwrap_err();
        assert!(matches!(
            err,
            QwError::IndexOutOfRange {
                what: "segment",
                index: 3,
                len: 1
            }
        ));
        assert!(c.choice(ChoicePath::new(1, 0, 0)).is_err());
    }

    #[test]
    fn ending_has_no_choices() {
        let c = chapter();
        let ending = c.segment(SegmentPath::new(1, 0)).unwrap();
        assert!(ending.options.is_none());
        assert!(ending.choices().is_empty());
    }

    #[test]
    fn default_goto_is_first_segment_of_first_branch() {
        let c = chapter();
        let goto = c.default_goto().unwrap();
        assert_eq!(goto.branch_id, c.branches[0].id);
        assert_eq!(goto.segment_id, c.branches[0].segments[0].id);
        assert!(c.resolves(&goto));
    }

    #[test]
    fn goto_must_name_segment_of_its_branch() {
        let c = chapter();
        let ending = c.branches[1].segments[0].id.clone();
        let wrong = Goto::new(c.branches[0].id.clone(), ending);
        assert!(!c.resolves(&wrong));
    }

    #[test]
    fn traversal_visits_every_choice() {
        let c = chapter();
        let all: Vec<_> = c.choices().map(|(path, _)| path).collect();
        assert_eq!(all, vec![ChoicePath::new(0, 0, 0)]);
        assert_eq!(c.segment_count(), 2);
        assert_eq!(c.choice_count(), 1);
    }

    #[test]
    fn paths_display_dotted() {
        assert_eq!(SegmentPath::new(0, 2).to_string(), "0.2");
        assert_eq!(ChoicePath::new(1, 0, 3).to_string(), "1.0.3");
    }

    #[test]
    fn ids_in_use() {
        let c = chapter();
        assert!(c.id_in_use(&Id::endings()));
        assert!(c.id_in_use(&c.branches[0].segments[0].id));
        assert!(!c.id_in_use(&Id::new("fresh")));
    }
}
