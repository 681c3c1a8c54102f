//! Conditions gating the availability of a choice.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::VariableState;
use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::value::{TypedValue, ValueKind};
use crate::variable::Variable;

/// How a condition compares its left variable to its right operand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// `==`
    #[default]
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
}

impl Comparator {
    /// Every comparator, in display order.
    pub const ALL: [Comparator; 6] = [
        Self::Equal,
        Self::NotEqual,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::Less,
        Self::LessOrEqual,
    ];

    /// The comparators valid for a variable of the given type.
    pub fn available_for(kind: ValueKind) -> &'static [Comparator] {
        match kind {
            ValueKind::Bool => &Self::ALL[..2],
            ValueKind::Number => &Self::ALL,
        }
    }

    /// Whether this comparator may be used with the given type.
    pub fn is_available_for(self, kind: ValueKind) -> bool {
        Self::available_for(kind).contains(&self)
    }

    /// Whether an ordering between left and right satisfies this comparator.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    /// The operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// What the right-hand side of a condition refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareTo {
    /// A literal value.
    Constant,
    /// Another story variable.
    Variable,
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Compare against a literal value.
    Constant(TypedValue),
    /// Compare against another variable's current value.
    ///
    /// Stored and validated, but not evaluated: see [`Condition::evaluate`].
    Variable(Id),
}

impl Operand {
    /// Which form this operand takes.
    pub fn compare_to(&self) -> CompareTo {
        match self {
            Self::Constant(_) => CompareTo::Constant,
            Self::Variable(_) => CompareTo::Variable,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Variable(id) => write!(f, "${id}"),
        }
    }
}

/// A gate comparing a variable to a constant or another variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConditionRepr", into = "ConditionRepr")]
pub struct Condition {
    /// The variable being tested.
    pub left: Id,
    /// How left and right are compared.
    pub comparator: Comparator,
    /// What the variable is compared against.
    pub right: Operand,
}

impl Condition {
    /// The default condition for a variable: `variable == initial_value`.
    pub fn for_variable(variable: &Variable) -> Self {
        Self {
            left: variable.id.clone(),
            comparator: Comparator::default(),
            right: Operand::Constant(variable.initial_value),
        }
    }

    /// Which form the right-hand side takes.
    pub fn compare_to(&self) -> CompareTo {
        self.right.compare_to()
    }

    /// Whether this condition refers to the given variable on either side.
    pub fn references(&self, variable: &Id) -> bool {
        self.left == *variable || matches!(&self.right, Operand::Variable(id) if id == variable)
    }

    /// Bring the comparator and operand in line with a left variable of type `kind`.
    ///
    /// An unavailable comparator falls back to `Equal`; a constant of the wrong
    /// tag becomes the type's zero value; a variable operand of a different
    /// type (per `kind_of`) becomes a zero constant. Returns whether anything
    /// changed.
    pub fn reconcile(
        &mut self,
        kind: ValueKind,
        kind_of: impl Fn(&Id) -> Option<ValueKind>,
    ) -> bool {
        let mut changed = false;
        if !self.comparator.is_available_for(kind) {
            self.comparator = Comparator::default();
            changed = true;
        }
        let operand_ok = match &self.right {
            Operand::Constant(v) => v.is(kind),
            Operand::Variable(id) => kind_of(id) == Some(kind),
        };
        if !operand_ok {
            self.right = Operand::Constant(kind.zero());
            changed = true;
        }
        changed
    }

    /// Evaluate the condition against the current variable values.
    ///
    /// Comparison to another variable is not supported by the engine and
    /// yields [`QwError::Unsupported`].
    pub fn evaluate(&self, state: &VariableState) -> QwResult<bool> {
        let left = state.value(&self.left)?;
        let right = match &self.right {
            Operand::Constant(v) => *v,
            Operand::Variable(_) => {
                return Err(QwError::Unsupported(
                    "comparison to another variable".to_string(),
                ));
            }
        };
        match left.partial_cmp(&right) {
            Some(ordering) => Ok(self.comparator.holds(ordering)),
            None if left.kind() != right.kind() => Err(QwError::TypeMismatch {
                expected: left.kind(),
                found: right.kind(),
            }),
            // NaN compares unequal to everything.
            None => Ok(self.comparator == Comparator::NotEqual),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {} {}", self.left, self.comparator, self.right)
    }
}

/// Persisted shape: `{left, comparator, compare_to, right}`.
#[derive(Serialize, Deserialize)]
struct ConditionRepr {
    left: Id,
    comparator: Comparator,
    compare_to: CompareTo,
    right: RightRepr,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RightRepr {
    Value(TypedValue),
    Variable(Id),
}

impl TryFrom<ConditionRepr> for Condition {
    type Error = String;

    fn try_from(repr: ConditionRepr) -> Result<Self, Self::Error> {
        let right = match (repr.compare_to, repr.right) {
            (CompareTo::Constant, RightRepr::Value(v)) => Operand::Constant(v),
            (CompareTo::Variable, RightRepr::Variable(id)) => Operand::Variable(id),
            (CompareTo::Constant, RightRepr::Variable(id)) => {
                return Err(format!(
                    "condition on {}: constant comparison needs a bool or number, found \"{id}\"",
                    repr.left
                ));
            }
            (CompareTo::Variable, RightRepr::Value(v)) => {
                return Err(format!(
                    "condition on {}: variable comparison needs a variable id, found {v}",
                    repr.left
                ));
            }
        };
        Ok(Self {
            left: repr.left,
            comparator: repr.comparator,
            right,
        })
    }
}

impl From<Condition> for ConditionRepr {
    fn from(c: Condition) -> Self {
        let compare_to = c.compare_to();
        let right = match c.right {
            Operand::Constant(v) => RightRepr::Value(v),
            Operand::Variable(id) => RightRepr::Variable(id),
        };
        Self {
            left: c.left,
            comparator: c.comparator,
            compare_to,
            right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> Variable {
        Variable::new(Id::new("flag"), "flag", TypedValue::Bool(true))
    }

    fn gold() -> Variable {
        Variable::new(Id::new("gold"), "gold", TypedValue::Number(5.0))
    }

    fn state() -> VariableState {
        VariableState::from_variables(&[flag(), gold()])
    }

    #[test]
    fn comparators_by_type() {
        assert_eq!(
            Comparator::available_for(ValueKind::Bool),
            &[Comparator::Equal, Comparator::NotEqual]
        );
        assert_eq!(Comparator::available_for(ValueKind::Number).len(), 6);
        assert!(!Comparator::Greater.is_available_for(ValueKind::Bool));
    }

    #[test]
    fn default_condition_uses_initial_value() {
        let cond = Condition::for_variable(&gold());
        assert_eq!(cond.comparator, Comparator::Equal);
        assert_eq!(cond.right, Operand::Constant(TypedValue::Number(5.0)));
        assert!(cond.evaluate(&state()).unwrap());
    }

    #[test]
    fn numeric_comparisons() {
        let mut cond = Condition::for_variable(&gold());
        cond.right = Operand::Constant(TypedValue::Number(3.0));

        cond.comparator = Comparator::Greater;
        assert!(cond.evaluate(&state()).unwrap());
        cond.comparator = Comparator::LessOrEqual;
        assert!(!cond.evaluate(&state()).unwrap());
        cond.comparator = Comparator::NotEqual;
        assert!(cond.evaluate(&state()).unwrap());
    }

    #[test]
    fn reconcile_bool_to_number() {
        let mut cond = Condition::for_variable(&flag());
        cond.comparator = Comparator::NotEqual;
        let changed = cond.reconcile(ValueKind::Number, |_| None);
        assert!(changed);
        assert_eq!(cond.comparator, Comparator::NotEqual);
        assert_eq!(cond.right, Operand::Constant(TypedValue::Number(0.0)));
    }

    #[test]
    fn reconcile_number_to_bool_resets_comparator() {
        let mut cond = Condition::for_variable(&gold());
        cond.comparator = Comparator::Greater;
        cond.reconcile(ValueKind::Bool, |_| None);
        assert_eq!(cond.comparator, Comparator::Equal);
        assert_eq!(cond.right, Operand::Constant(TypedValue::Bool(false)));
    }

    #[test]
    fn reconcile_same_type_is_noop() {
        let mut cond = Condition::for_variable(&gold());
        cond.comparator = Comparator::Less;
        assert!(!cond.reconcile(ValueKind::Number, |_| None));
        assert_eq!(cond.comparator, Comparator::Less);
    }

    #[test]
    fn variable_operand_not_evaluated() {
        let cond = Condition {
            left: Id::new("gold"),
            comparator: Comparator::Equal,
            right: Operand::Variable(Id::new("gold")),
        };
        assert!(matches!(
            cond.evaluate(&state()),
            Err(QwError::Unsupported(_))
        ));
        assert!(cond.references(&Id::new("gold")));
    }

    #[test]
    fn persisted_form_is_flat() {
        let cond = Condition::for_variable(&flag());
        let json = serde_json::to_string(&cond).unwrap();
        assert_eq!(
            json,
            r#"{"left":"flag","comparator":"equal","compare_to":"constant","right":true}"#
        );

        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cond);
    }

    #[test]
    fn variable_operand_round_trips() {
        let json = r#"{"left":"a","comparator":"less","compare_to":"variable","right":"b"}"#;
        let cond: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(cond.right, Operand::Variable(Id::new("b")));
        assert_eq!(serde_json::to_string(&cond).unwrap(), json);
    }

    #[test]
    fn mismatched_compare_to_rejected() {
        let json = r#"{"left":"a","comparator":"equal","compare_to":"constant","right":"b"}"#;
        assert!(serde_json::from_str::<Condition>(json).is_err());
        let json = r#"{"left":"a","comparator":"equal","compare_to":"variable","right":1}"#;
        assert!(serde_json::from_str::<Condition>(json).is_err());
    }
}
