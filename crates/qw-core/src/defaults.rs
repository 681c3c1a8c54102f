//! Default entities and the generator for a new chapter.

use crate::chapter::{Branch, Chapter, Choice, Goto, Segment};
use crate::id::{Id, IdGenerator, SequentialIds, UuidIds};
use crate::value::ValueKind;
use crate::variable::Variable;

/// Display texts given to newly created entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTexts {
    /// Title of a generated chapter.
    pub chapter_title: String,
    /// Title of a new branch.
    pub branch_title: String,
    /// Text of a new ordinary segment.
    pub segment_text: String,
    /// Text of a new ending.
    pub ending_text: String,
    /// Text of a new choice.
    pub choice_text: String,
    /// Name of a new variable.
    pub variable_name: String,
}

impl Default for DefaultTexts {
    fn default() -> Self {
        Self {
            chapter_title: "New chapter".to_string(),
            branch_title: "New branch".to_string(),
            segment_text: "New segment".to_string(),
            ending_text: "New ending".to_string(),
            choice_text: "New option".to_string(),
            variable_name: "New variable".to_string(),
        }
    }
}

/// Builds new entities with fresh ids and default texts.
pub struct Factory {
    ids: Box<dyn IdGenerator>,
    texts: DefaultTexts,
}

impl Factory {
    /// Create a factory from an id generator and default texts.
    pub fn new(ids: impl IdGenerator + 'static, texts: DefaultTexts) -> Self {
        Self {
            ids: Box::new(ids),
            texts,
        }
    }

    /// A factory with deterministic `id-<n>` ids and default texts.
    pub fn sequential() -> Self {
        Self::new(SequentialIds::default(), DefaultTexts::default())
    }

    /// The default texts in use.
    pub fn texts(&self) -> &DefaultTexts {
        &self.texts
    }

    /// Issue an id not yet used anywhere in `chapter`.
    pub fn fresh_id(&mut self, chapter: &Chapter) -> Id {
        loop {
            let id = self.ids.next_id();
            if !chapter.id_in_use(&id) {
                return id;
            }
        }
    }

    /// A minimally valid chapter.
    ///
    /// One ordinary branch holding one segment whose single choice loops back
    /// to that segment, followed by the `@endings` branch with one ending.
    pub fn chapter(&mut self) -> Chapter {
        let branch_id = self.ids.next_id();
        let segment_id = self.ids.next_id();
        let ending_id = self.ids.next_id();
        let goto = Goto::new(branch_id.clone(), segment_id.clone());

        Chapter {
            title: self.texts.chapter_title.clone(),
            branches: vec![
                Branch::new(
                    branch_id,
                    self.texts.branch_title.clone(),
                    vec![self.segment(segment_id, goto)],
                ),
                Branch::new(Id::endings(), "", vec![self.ending(ending_id)]),
            ],
            variables: Vec::new(),
        }
    }

    /// A branch with one default segment.
    pub fn branch(&self, id: Id, segment_id: Id, goto: Goto) -> Branch {
        Branch::new(
            id,
            self.texts.branch_title.clone(),
            vec![self.segment(segment_id, goto)],
        )
    }

    /// An ordinary segment with one default choice.
    pub fn segment(&self, id: Id, goto: Goto) -> Segment {
        Segment::new(id, self.texts.segment_text.clone(), vec![self.choice(goto)])
    }

    /// An ending segment.
    pub fn ending(&self, id: Id) -> Segment {
        Segment::ending(id, self.texts.ending_text.clone())
    }

    /// A choice with no conditions or operations.
    pub fn choice(&self, goto: Goto) -> Choice {
        Choice::new(self.texts.choice_text.clone(), goto)
    }

    /// A variable of the given type, initialised to its zero value.
    pub fn variable(&self, id: Id, kind: ValueKind) -> Variable {
        Variable::new(id, self.texts.variable_name.clone(), kind.zero())
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new(UuidIds, DefaultTexts::default())
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("texts", &self.texts)
            .finish_non_exhaustive()
    }
}
