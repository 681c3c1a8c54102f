//! Variable values during a playthrough.

use std::collections::HashMap;

use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::value::TypedValue;
use crate::variable::Variable;

/// Current value of every story variable, keyed by variable id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableState {
    values: HashMap<Id, TypedValue>,
}

impl VariableState {
    /// Seed the state from the variables' initial values.
    pub fn from_variables(variables: &[Variable]) -> Self {
        Self {
            values: variables
                .iter()
                .map(|v| (v.id.clone(), v.initial_value))
                .collect(),
        }
    }

    /// Current value of a variable.
    pub fn value(&self, id: &Id) -> QwResult<TypedValue> {
        self.values
            .get(id)
            .copied()
            .ok_or_else(|| QwError::VariableNotFound(id.clone()))
    }

    /// Overwrite a variable's value. The type may not change.
    pub fn set(&mut self, id: &Id, value: TypedValue) -> QwResult<()> {
        let slot = self
            .values
            .get_mut(id)
            .ok_or_else(|| QwError::VariableNotFound(id.clone()))?;
        if slot.kind() != value.kind() {
            return Err(QwError::TypeMismatch {
                expected: slot.kind(),
                found: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Number of tracked variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variables are tracked.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_from_initial_values() {
        let vars = [
            Variable::new(Id::new("a"), "a", TypedValue::Bool(true)),
            Variable::new(Id::new("b"), "b", TypedValue::Number(2.0)),
        ];
        let state = VariableState::from_variables(&vars);
        assert_eq!(state.len(), 2);
        assert_eq!(state.value(&Id::new("a")).unwrap(), TypedValue::Bool(true));
    }

    #[test]
    fn set_rejects_type_change() {
        let vars = [Variable::new(Id::new("a"), "a", TypedValue::Bool(true))];
        let mut state = VariableState::from_variables(&vars);
        assert!(state.set(&Id::new("a"), TypedValue::Number(1.0)).is_err());
        assert!(state.set(&Id::new("missing"), TypedValue::Bool(false)).is_err());
        state.set(&Id::new("a"), TypedValue::Bool(false)).unwrap();
        assert_eq!(state.value(&Id::new("a")).unwrap(), TypedValue::Bool(false));
    }
}
