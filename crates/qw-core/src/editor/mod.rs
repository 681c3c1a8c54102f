//! Editing session: one chapter, its backing store, and the state around it.
//!
//! The [`Editor`] is what a front end drives. It applies [`Edit`]s, asks for
//! confirmation before destructive ones, tracks whether the chapter needs
//! saving, keeps the selection pointing at things that exist, and tells
//! subscribers about all of it.

mod confirm;
mod event;
mod selection;

pub use confirm::{AlwaysNo, AlwaysYes, Confirm};
pub use event::{EditorEvent, FileState};
pub use selection::EditorSelection;

use tracing::{debug, info, warn};

use crate::chapter::{Chapter, SegmentPath};
use crate::config::EditorConfig;
use crate::defaults::Factory;
use crate::edit::{Edit, EditOutcome};
use crate::error::{QwError, QwResult};
use crate::id::IdGenerator;
use crate::storage::{self, Storage};
use crate::validate::validate;

/// A subscriber callback.
pub type Subscriber = Box<dyn FnMut(&EditorEvent)>;

/// An open chapter.
pub struct Editor<S> {
    chapter: Chapter,
    state: FileState,
    selection: EditorSelection,
    factory: Factory,
    storage: S,
    config: EditorConfig,
    subscribers: Vec<Subscriber>,
}

impl<S: Storage> Editor<S> {
    /// Open the chapter held by `storage`.
    ///
    /// An empty store gets a freshly generated chapter, written back at once
    /// so the store always holds a valid document. A non-empty store is
    /// parsed and, if configured, validated.
    pub fn open(
        mut storage: S,
        ids: impl IdGenerator + 'static,
        config: EditorConfig,
    ) -> QwResult<Self> {
        let mut factory = Factory::new(ids, config.texts.clone());
        let bytes = storage.read_all()?;
        let (chapter, generated) = storage::load(&bytes, &mut factory)?;

        if !generated && config.validate_on_load {
            let violations = validate(&chapter);
            if !violations.is_empty() {
                for violation in &violations {
                    warn!(%violation, "invalid chapter");
                }
                return Err(QwError::Invalid(violations));
            }
        }

        let mut editor = Self {
            chapter,
            state: FileState::default(),
            selection: EditorSelection::default(),
            factory,
            storage,
            config,
            subscribers: Vec::new(),
        };
        if generated {
            info!("generated new chapter");
            editor.write()?;
        } else {
            info!(
                title = %editor.chapter.title,
                branches = editor.chapter.branches.len(),
                variables = editor.chapter.variables.len(),
                "loaded chapter"
            );
        }
        Ok(editor)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The chapter being edited.
    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    /// The session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The backing store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Close the session, returning the backing store.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Whether there are unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    /// The current selection.
    pub fn selection(&self) -> &EditorSelection {
        &self.selection
    }

    /// Register a callback for [`EditorEvent`]s.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&EditorEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn emit(&mut self, event: EditorEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Apply an edit.
    ///
    /// Destructive edits are checked first, then confirmed; a "no" leaves the
    /// chapter untouched and yields [`EditOutcome::Declined`]. A rejected edit
    /// changes nothing either.
    pub fn apply(&mut self, edit: Edit, confirm: &mut dyn Confirm) -> QwResult<EditOutcome> {
        let outcome = if edit.is_destructive() {
            let mut draft = self.chapter.clone();
            let outcome = draft
                .apply(&edit, &mut self.factory)
                .inspect_err(|error| warn!(%error, ?edit, "edit rejected"))?;
            let prompt = self.prompt_for(&edit);
            if !confirm.confirm(&prompt) {
                debug!(?edit, "edit declined");
                return Ok(EditOutcome::Declined);
            }
            self.chapter = draft;
            outcome
        } else {
            self.chapter
                .apply(&edit, &mut self.factory)
                .inspect_err(|error| warn!(%error, ?edit, "edit rejected"))?
        };
        debug!(?edit, ?outcome, "applied edit");

        if let Some(event) = self.state.mark_dirty() {
            self.emit(event);
        }
        if edit.refreshes_dependents() {
            self.emit(EditorEvent::RefreshDependents);
        }
        self.follow(&edit, &outcome);
        Ok(outcome)
    }

    fn prompt_for(&self, edit: &Edit) -> String {
        let chapter = &self.chapter;
        let what = match edit {
            Edit::DeleteBranch { index } => chapter.branch_at(*index).ok().map(|b| {
                format!("branch \"{}\" and all of its segments", b.label())
            }),
            Edit::DeleteSegment { at } => chapter
                .segment(*at)
                .ok()
                .map(|s| format!("segment \"{}\"", crate::query::shorten(&s.text))),
            Edit::DeleteChoice { at } => chapter
                .choice(*at)
                .ok()
                .map(|c| format!("option \"{}\"", c.text)),
            Edit::DeleteCondition { at, index } => chapter
                .condition(*at, *index)
                .ok()
                .map(|c| format!("condition {c}")),
            Edit::DeleteOperation { at, index } => chapter
                .operation(*at, *index)
                .ok()
                .map(|o| format!("operation {o}")),
            Edit::DeleteVariable { id } => chapter.variable(id).map(|v| {
                format!(
                    "variable \"{}\" and every condition and operation using it",
                    v.name
                )
            }),
            _ => None,
        };
        format!("Delete {}?", what.as_deref().unwrap_or("this item"))
    }

    /// Move the selection onto what an edit created or moved, then drop
    /// whatever it left dangling.
    fn follow(&mut self, edit: &Edit, outcome: &EditOutcome) {
        let before = self.selection.clone();
        let chapter = &self.chapter;
        let selection = &mut self.selection;

        match (edit, outcome) {
            (Edit::AddBranch { .. }, EditOutcome::Inserted(index)) => {
                if let Some(branch) = chapter.branches.get(*index) {
                    *selection = EditorSelection {
                        branch: Some(branch.id.clone()),
                        ..EditorSelection::default()
                    };
                }
            }
            (Edit::AddSegment { branch, .. }, EditOutcome::Inserted(index)) => {
                if let Some(branch) = chapter.branches.get(*branch) {
                    *selection = EditorSelection {
                        branch: Some(branch.id.clone()),
                        segment: branch.segments.get(*index).map(|s| s.id.clone()),
                        choice: None,
                    };
                }
            }
            (Edit::AddChoice { at, .. }, EditOutcome::Inserted(index))
                if selection.segment_path(chapter) == Some(*at) =>
            {
                selection.choice = Some(*index);
            }
            (Edit::MoveChoice { at, .. }, EditOutcome::Moved(index))
                if selection.segment_path(chapter) == Some(at.segment_path()) =>
            {
                if selection.choice == Some(at.choice) {
                    selection.choice = Some(*index);
                } else if selection.choice == Some(*index) {
                    selection.choice = Some(at.choice);
                }
            }
            (Edit::DeleteChoice { at }, _)
                if selection.segment_path(chapter) == Some(at.segment_path()) =>
            {
                selection.choice = None;
            }
            _ => {}
        }
        selection.repair(chapter);

        if self.selection != before {
            let event = EditorEvent::SelectionChanged(self.selection.clone());
            self.emit(event);
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    fn set_selection(&mut self, selection: EditorSelection) {
        if selection != self.selection {
            self.selection = selection;
            let event = EditorEvent::SelectionChanged(self.selection.clone());
            self.emit(event);
        }
    }

    /// Select a branch by index, or clear the selection.
    pub fn select_branch(&mut self, index: Option<usize>) -> QwResult<()> {
        let branch = index
            .map(|i| self.chapter.branch_at(i).map(|b| b.id.clone()))
            .transpose()?;
        self.set_selection(EditorSelection {
            branch,
            ..EditorSelection::default()
        });
        Ok(())
    }

    /// Select a segment of the selected branch, or clear it.
    pub fn select_segment(&mut self, index: Option<usize>) -> QwResult<()> {
        let segment = match index {
            None => None,
            Some(i) => {
                let branch = self.selection.branch_index(&self.chapter).ok_or_else(|| {
                    QwError::not_permitted("select a branch before a segment")
                })?;
                let at = SegmentPath::new(branch, i);
                Some(self.chapter.segment(at)?.id.clone())
            }
        };
        self.set_selection(EditorSelection {
            branch: self.selection.branch.clone(),
            segment,
            choice: None,
        });
        Ok(())
    }

    /// Select a choice of the selected segment, or clear it.
    pub fn select_choice(&mut self, index: Option<usize>) -> QwResult<()> {
        if let Some(i) = index {
            let at = self.selection.segment_path(&self.chapter).ok_or_else(|| {
                QwError::not_permitted("select a segment before an option")
            })?;
            self.chapter.choice(at.choice(i))?;
        }
        let mut selection = self.selection.clone();
        selection.choice = index;
        self.set_selection(selection);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the whole chapter to the backing store.
    pub fn save(&mut self) -> QwResult<()> {
        self.write()?;
        if let Some(event) = self.state.mark_clean() {
            self.emit(event);
        }
        Ok(())
    }

    fn write(&mut self) -> QwResult<()> {
        let bytes = storage::save(&self.chapter, self.config.indent)?;
        self.storage.write_all(&bytes)?;
        info!(bytes = bytes.len(), "saved chapter");
        Ok(())
    }
}
