//! Operations: consequences of picking a choice.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::VariableState;
use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::value::{TypedValue, ValueKind};
use crate::variable::Variable;

/// How an operation mutates its variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Replace the value.
    #[default]
    Set,
    /// Add the operand.
    Add,
    /// Subtract the operand.
    Subtract,
    /// Multiply by the operand.
    Multiply,
    /// Divide by the operand.
    Divide,
}

impl OperationKind {
    /// Every operation kind, in display order.
    pub const ALL: [OperationKind; 5] = [
        Self::Set,
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
    ];

    /// The kinds valid for a variable of the given type.
    pub fn available_for(kind: ValueKind) -> &'static [OperationKind] {
        match kind {
            ValueKind::Bool => &Self::ALL[..1],
            ValueKind::Number => &Self::ALL,
        }
    }

    /// Whether this kind may be used with the given type.
    pub fn is_available_for(self, kind: ValueKind) -> bool {
        Self::available_for(kind).contains(&self)
    }

    /// The operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Subtract => "-=",
            Self::Multiply => "*=",
            Self::Divide => "/=",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A consequence that mutates a story variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// The variable being mutated.
    pub variable_id: Id,
    /// How the variable is mutated.
    pub kind: OperationKind,
    /// The operand; its tag matches the variable's type.
    pub value: TypedValue,
}

impl Operation {
    /// The default operation for a variable: set it to its initial value.
    pub fn for_variable(variable: &Variable) -> Self {
        Self {
            variable_id: variable.id.clone(),
            kind: OperationKind::default(),
            value: variable.initial_value,
        }
    }

    /// Bring the kind and operand in line with a target variable of type `kind`.
    ///
    /// Returns whether anything changed.
    pub fn reconcile(&mut self, kind: ValueKind) -> bool {
        let mut changed = false;
        if !self.kind.is_available_for(kind) {
            self.kind = OperationKind::default();
            changed = true;
        }
        if !self.value.is(kind) {
            self.value = kind.zero();
            changed = true;
        }
        changed
    }

    /// Apply the operation to the current variable values.
    pub fn apply(&self, state: &mut VariableState) -> QwResult<()> {
        let current = state.value(&self.variable_id)?;
        if current.kind() != self.value.kind() {
            return Err(QwError::TypeMismatch {
                expected: current.kind(),
                found: self.value.kind(),
            });
        }
        let next = match (self.kind, current, self.value) {
            (OperationKind::Set, _, v) => v,
            (kind, TypedValue::Number(a), TypedValue::Number(b)) => match kind {
                OperationKind::Add => TypedValue::Number(a + b),
                OperationKind::Subtract => TypedValue::Number(a - b),
                OperationKind::Multiply => TypedValue::Number(a * b),
                OperationKind::Divide if b == 0.0 => {
                    return Err(QwError::DivisionByZero(self.variable_id.clone()));
                }
                OperationKind::Divide => TypedValue::Number(a / b),
                OperationKind::Set => TypedValue::Number(b),
            },
            (kind, _, _) => {
                return Err(QwError::Unsupported(format!(
                    "operation {kind} on {}",
                    current.kind()
                )));
            }
        };
        state.set(&self.variable_id, next)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {} {}", self.variable_id, self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> Variable {
        Variable::new(Id::new("flag"), "flag", TypedValue::Bool(false))
    }

    fn gold() -> Variable {
        Variable::new(Id::new("gold"), "gold", TypedValue::Number(10.0))
    }

    fn state() -> VariableState {
        VariableState::from_variables(&[flag(), gold()])
    }

    #[test]
    fn kinds_by_type() {
        assert_eq!(
            OperationKind::available_for(ValueKind::Bool),
            &[OperationKind::Set]
        );
        assert!(OperationKind::Divide.is_available_for(ValueKind::Number));
        assert!(!OperationKind::Add.is_available_for(ValueKind::Bool));
    }

    #[test]
    fn set_flag() {
        let mut state = state();
        let mut op = Operation::for_variable(&flag());
        op.value = TypedValue::Bool(true);
        op.apply(&mut state).unwrap();
        assert_eq!(state.value(&Id::new("flag")).unwrap(), TypedValue::Bool(true));
    }

    #[test]
    fn arithmetic() {
        let mut state = state();
        let id = Id::new("gold");
        let op = |kind, value| Operation {
            variable_id: id.clone(),
            kind,
            value: TypedValue::Number(value),
        };

        op(OperationKind::Add, 5.0).apply(&mut state).unwrap();
        op(OperationKind::Multiply, 2.0).apply(&mut state).unwrap();
        op(OperationKind::Subtract, 6.0).apply(&mut state).unwrap();
        op(OperationKind::Divide, 4.0).apply(&mut state).unwrap();
        assert_eq!(state.value(&id).unwrap(), TypedValue::Number(6.0));
    }

    #[test]
    fn divide_by_zero_rejected() {
        let mut state = state();
        let op = Operation {
            variable_id: Id::new("gold"),
            kind: OperationKind::Divide,
            value: TypedValue::Number(0.0),
        };
        assert!(matches!(
            op.apply(&mut state),
            Err(QwError::DivisionByZero(_))
        ));
        assert_eq!(
            state.value(&Id::new("gold")).unwrap(),
            TypedValue::Number(10.0)
        );
    }

    #[test]
    fn reconcile_resets_kind_and_value() {
        let mut op = Operation::for_variable(&gold());
        op.kind = OperationKind::Multiply;
        assert!(op.reconcile(ValueKind::Bool));
        assert_eq!(op.kind, OperationKind::Set);
        assert_eq!(op.value, TypedValue::Bool(false));
    }

    #[test]
    fn reconcile_keeps_matching_value() {
        let mut op = Operation::for_variable(&gold());
        op.kind = OperationKind::Add;
        assert!(!op.reconcile(ValueKind::Number));
        assert_eq!(op.kind, OperationKind::Add);
        assert_eq!(op.value, TypedValue::Number(10.0));
    }

    #[test]
    fn persisted_field_names() {
        let op = Operation::for_variable(&flag());
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"variable_id":"flag","kind":"set","value":false}"#);
    }
}
