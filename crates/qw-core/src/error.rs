use crate::id::Id;
use crate::validate::Violation;
use crate::value::ValueKind;

/// Alias for `Result<T, QwError>`.
pub type QwResult<T> = Result<T, QwError>;

/// Errors that can occur when loading, editing, or saving a chapter.
#[derive(Debug, thiserror::Error)]
pub enum QwError {
    /// The edit would break a document invariant and was rejected.
    ///
    /// The document is left unmodified.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// A positional index does not address an existing element.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The kind of element being addressed.
        what: &'static str,
        /// The offending index.
        index: usize,
        /// The length of the addressed list.
        len: usize,
    },

    /// The requested branch ID does not exist in the chapter.
    #[error("branch not found: {0}")]
    BranchNotFound(Id),

    /// The requested variable ID does not exist in the chapter.
    #[error("variable not found: {0}")]
    VariableNotFound(Id),

    /// A value's type does not match the variable it is assigned to.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The variable's type.
        expected: ValueKind,
        /// The type of the supplied value.
        found: ValueKind,
    },

    /// The chapter has no `@endings` branch.
    #[error("chapter has no {} branch", Id::ENDINGS)]
    MissingEndings,

    /// Division by zero while applying an operation.
    #[error("division by zero applying operation on {0}")]
    DivisionByZero(Id),

    /// A feature the engine does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The loaded chapter breaks one or more document invariants.
    #[error("invalid chapter: {} violation(s)", .0.len())]
    Invalid(Vec<Violation>),

    /// The persisted form could not be parsed or produced.
    #[error("malformed chapter data: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing store could not be read or written.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl QwError {
    pub(crate) fn not_permitted(reason: impl Into<String>) -> Self {
        Self::NotPermitted(reason.into())
    }

    /// Whether this error is an edit rejected at the API boundary.
    pub fn is_not_permitted(&self) -> bool {
        matches!(self, Self::NotPermitted(_))
    }
}
