use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a story variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// A true/false flag.
    Bool,
    /// A floating-point number.
    Number,
}

impl ValueKind {
    /// The zero value of this type: `false` or `0.0`.
    pub fn zero(self) -> TypedValue {
        match self {
            Self::Bool => TypedValue::Bool(false),
            Self::Number => TypedValue::Number(0.0),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// A variable value, comparison operand, or operation operand.
///
/// Persisted untagged: a JSON `true`/`false` or a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// A boolean value.
    Bool(bool),
    /// A numeric value.
    Number(f64),
}

impl TypedValue {
    /// The type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
        }
    }

    /// Whether this value carries the given type tag.
    pub fn is(&self, kind: ValueKind) -> bool {
        self.kind() == kind
    }

    /// False for NaN and infinities, which have no JSON form.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Bool(_) => true,
            Self::Number(n) => n.is_finite(),
        }
    }
}

/// Values are ordered only within the same tag; `true > false`.
impl PartialOrd for TypedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for TypedValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values() {
        assert_eq!(ValueKind::Bool.zero(), TypedValue::Bool(false));
        assert_eq!(ValueKind::Number.zero(), TypedValue::Number(0.0));
    }

    #[test]
    fn no_ordering_across_tags() {
        let b = TypedValue::Bool(true);
        let n = TypedValue::Number(1.0);
        assert_ne!(b, n);
        assert_eq!(b.partial_cmp(&n), None);
        assert!(TypedValue::Number(2.0) > TypedValue::Number(1.5));
        assert!(TypedValue::Bool(true) > TypedValue::Bool(false));
    }

    #[test]
    fn untagged_json_form() {
        assert_eq!(serde_json::to_string(&TypedValue::Bool(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&TypedValue::Number(2.5)).unwrap(), "2.5");

        let v: TypedValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, TypedValue::Number(3.0));
        let v: TypedValue = serde_json::from_str("false").unwrap();
        assert_eq!(v, TypedValue::Bool(false));
        assert!(serde_json::from_str::<TypedValue>("\"x\"").is_err());
    }

    #[test]
    fn finiteness() {
        assert!(TypedValue::Bool(true).is_finite());
        assert!(TypedValue::Number(-1e300).is_finite());
        assert!(!TypedValue::Number(f64::INFINITY).is_finite());
        assert!(!TypedValue::Number(f64::NAN).is_finite());
    }
}
