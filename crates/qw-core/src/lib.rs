//! Core document model for Questwriter: branching quest chapters.
//!
//! A [`Chapter`] holds ordered branches of text segments. Each segment offers
//! choices that jump to other segments, optionally gated by conditions over
//! typed story variables and producing operations on them. Structural edits
//! keep every cross-reference valid, repairing the ones a deletion would
//! leave dangling.

/// The chapter document tree.
pub mod chapter;
/// Editing session configuration.
pub mod config;
/// Default entities and the new-chapter generator.
pub mod defaults;
/// Structural edit operations and the `Edit` command.
pub mod edit;
/// Editing session: dirty state, selection, notifications.
pub mod editor;
/// Error types used throughout the crate.
pub mod error;
/// Identifiers and id generators.
pub mod id;
/// Picker entries and capability checks.
pub mod query;
/// Conditions, operations and their evaluation.
pub mod rule;
/// Persisted form and backing stores.
pub mod storage;
/// Whole-document invariant checks.
pub mod validate;
/// Typed variable values.
pub mod value;
/// Story variables.
pub mod variable;

/// Re-export document types.
pub use chapter::{Branch, Chapter, Choice, ChoicePath, Goto, Segment, SegmentPath};
/// Re-export configuration.
pub use config::EditorConfig;
/// Re-export the entity factory.
pub use defaults::{DefaultTexts, Factory};
/// Re-export edit commands.
pub use edit::{CascadeReport, Edit, EditOutcome};
/// Re-export the editing session.
pub use editor::{AlwaysNo, AlwaysYes, Confirm, Editor, EditorEvent, EditorSelection};
/// Re-export error types.
pub use error::{QwError, QwResult};
/// Re-export identifier types.
pub use id::{Id, IdGenerator, SequentialIds, UuidIds};
/// Re-export storage types.
pub use storage::{FileStorage, MemoryStorage, Storage};
/// Re-export validation.
pub use validate::{Violation, validate};
/// Re-export value types.
pub use value::{TypedValue, ValueKind};
/// Re-export the variable type.
pub use variable::Variable;
