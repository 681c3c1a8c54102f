use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for branches, segments, and variables.
///
/// Ids starting with `@` are reserved for system-owned branches; everything
/// else is issued by an [`IdGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Id of the reserved branch that holds terminal segments.
    pub const ENDINGS: &'static str = "@endings";

    /// Wrap an existing string as an id.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The id of the `@endings` branch.
    pub fn endings() -> Self {
        Self(Self::ENDINGS.to_string())
    }

    /// Whether this id is system-owned (starts with `@`).
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with('@')
    }

    /// Whether this is the `@endings` branch id.
    pub fn is_endings(&self) -> bool {
        self.0 == Self::ENDINGS
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Source of fresh identifiers.
///
/// Implementations must never hand out the same id twice and never return a
/// reserved (`@`-prefixed) id.
pub trait IdGenerator {
    /// Produce a new identifier.
    fn next_id(&mut self) -> Id;
}

/// Random v4 UUID identifiers, the generator used for real documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> Id {
        Id(Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-<n>` identifiers for tests and reproducible output.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Create a generator producing `<prefix>-1`, `<prefix>-2`, ...
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Id {
        let id = Id(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endings_id_is_reserved() {
        let id = Id::endings();
        assert!(id.is_reserved());
        assert!(id.is_endings());
        assert_eq!(id.to_string(), "@endings");
    }

    #[test]
    fn any_at_prefix_is_reserved() {
        assert!(Id::new("@intro").is_reserved());
        assert!(!Id::new("@intro").is_endings());
        assert!(!Id::new("intro").is_reserved());
    }

    #[test]
    fn uuid_ids_are_unique_and_unreserved() {
        let mut ids = UuidIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(!a.is_reserved());
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new("seg");
        assert_eq!(ids.next_id(), Id::new("seg-1"));
        assert_eq!(ids.next_id(), Id::new("seg-2"));
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let json = serde_json::to_string(&Id::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
