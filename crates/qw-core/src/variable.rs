use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::value::{TypedValue, ValueKind};

/// A named, typed, chapter-scoped story variable.
///
/// The variable's type is the tag of its initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique identifier, referenced by conditions and operations.
    pub id: Id,
    /// Display name. Free to change; references go through `id`.
    pub name: String,
    /// Value the variable holds at the start of a playthrough.
    pub initial_value: TypedValue,
}

impl Variable {
    /// Create a variable with the given id, name, and initial value.
    pub fn new(id: Id, name: impl Into<String>, initial_value: TypedValue) -> Self {
        Self {
            id,
            name: name.into(),
            initial_value,
        }
    }

    /// The variable's type.
    pub fn kind(&self) -> ValueKind {
        self.initial_value.kind()
    }
}
