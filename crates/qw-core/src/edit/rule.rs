use tracing::debug;

use super::{check_index, insert_position, shift};
use crate::chapter::{Chapter, ChoicePath};
use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::rule::{Comparator, Condition, Operand, Operation, OperationKind};
use crate::value::{TypedValue, ValueKind};
use crate::variable::Variable;

impl Chapter {
    /// Type of a variable by id.
    pub fn variable_kind(&self, id: &Id) -> QwResult<ValueKind> {
        self.variable(id)
            .map(Variable::kind)
            .ok_or_else(|| QwError::VariableNotFound(id.clone()))
    }

    fn checked_value(&self, id: &Id, value: TypedValue) -> QwResult<TypedValue> {
        let expected = self.variable_kind(id)?;
        if !value.is(expected) {
            return Err(QwError::TypeMismatch {
                expected,
                found: value.kind(),
            });
        }
        finite(value)
    }

    // -----------------------------------------------------------------------
    // Conditions
    // -----------------------------------------------------------------------

    /// Get a condition of a choice.
    pub fn condition(&self, at: ChoicePath, index: usize) -> QwResult<&Condition> {
        let conditions = &self.choice(at)?.conditions;
        check_index("condition", index, conditions.len())?;
        Ok(&conditions[index])
    }

    fn condition_mut(&mut self, at: ChoicePath, index: usize) -> QwResult<&mut Condition> {
        let conditions = &mut self.choice_mut(at)?.conditions;
        check_index("condition", index, conditions.len())?;
        Ok(&mut conditions[index])
    }

    /// Insert `variable == initial value` on a choice and return its index.
    pub fn add_condition(
        &mut self,
        at: ChoicePath,
        after: Option<usize>,
        variable: &Id,
    ) -> QwResult<usize> {
        let condition = Condition::for_variable(
            self.variable(variable)
                .ok_or_else(|| QwError::VariableNotFound(variable.clone()))?,
        );
        let position = insert_position("condition", after, self.choice(at)?.conditions.len())?;
        self.choice_mut(at)?.conditions.insert(position, condition);
        debug!(%variable, position, "added condition");
        Ok(position)
    }

    /// Swap a condition with its neighbour.
    pub fn move_condition(&mut self, at: ChoicePath, index: usize, delta: isize) -> QwResult<usize> {
        shift(&mut self.choice_mut(at)?.conditions, "condition", index, delta)
    }

    /// Remove a condition. A choice may end up with none.
    pub fn delete_condition(&mut self, at: ChoicePath, index: usize) -> QwResult<Condition> {
        let conditions = &mut self.choice_mut(at)?.conditions;
        check_index("condition", index, conditions.len())?;
        Ok(conditions.remove(index))
    }

    /// Test a different variable.
    ///
    /// When the new variable's type cannot support the current comparator or
    /// operand, they are reset. Returns whether a reset happened.
    pub fn set_condition_variable(
        &mut self,
        at: ChoicePath,
        index: usize,
        variable: &Id,
    ) -> QwResult<bool> {
        let kind = self.variable_kind(variable)?;
        let mut condition = self.condition(at, index)?.clone();
        condition.left = variable.clone();
        let reset = condition.reconcile(kind, |id| self.variable(id).map(Variable::kind));
        *self.condition_mut(at, index)? = condition;
        if reset {
            debug!(%variable, "condition reset to fit variable type");
        }
        Ok(reset)
    }

    /// Change the comparator. It must be available for the variable's type.
    pub fn set_condition_comparator(
        &mut self,
        at: ChoicePath,
        index: usize,
        comparator: Comparator,
    ) -> QwResult<()> {
        let condition = self.condition(at, index)?;
        let kind = self.variable_kind(&condition.left)?;
        if !comparator.is_available_for(kind) {
            return Err(QwError::not_permitted(format!(
                "comparator {comparator} is not available for {kind} variables"
            )));
        }
        self.condition_mut(at, index)?.comparator = comparator;
        Ok(())
    }

    /// Compare against a constant of the variable's type.
    pub fn set_condition_value(
        &mut self,
        at: ChoicePath,
        index: usize,
        value: TypedValue,
    ) -> QwResult<()> {
        let left = self.condition(at, index)?.left.clone();
        let value = self.checked_value(&left, value)?;
        self.condition_mut(at, index)?.right = Operand::Constant(value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Get an operation of a choice.
    pub fn operation(&self, at: ChoicePath, index: usize) -> QwResult<&Operation> {
        let operations = &self.choice(at)?.operations;
        check_index("operation", index, operations.len())?;
        Ok(&operations[index])
    }

    fn operation_mut(&mut self, at: ChoicePath, index: usize) -> QwResult<&mut Operation> {
        let operations = &mut self.choice_mut(at)?.operations;
        check_index("operation", index, operations.len())?;
        Ok(&mut operations[index])
    }

    /// Insert `variable := initial value` on a choice and return its index.
    pub fn add_operation(
        &mut self,
        at: ChoicePath,
        after: Option<usize>,
        variable: &Id,
    ) -> QwResult<usize> {
        let operation = Operation::for_variable(
            self.variable(variable)
                .ok_or_else(|| QwError::VariableNotFound(variable.clone()))?,
        );
        let position = insert_position("operation", after, self.choice(at)?.operations.len())?;
        self.choice_mut(at)?.operations.insert(position, operation);
        debug!(%variable, position, "added operation");
        Ok(position)
    }

    /// Swap an operation with its neighbour.
    pub fn move_operation(&mut self, at: ChoicePath, index: usize, delta: isize) -> QwResult<usize> {
        shift(&mut self.choice_mut(at)?.operations, "operation", index, delta)
    }

    /// Remove an operation. A choice may end up with none.
    pub fn delete_operation(&mut self, at: ChoicePath, index: usize) -> QwResult<Operation> {
        let operations = &mut self.choice_mut(at)?.operations;
        check_index("operation", index, operations.len())?;
        Ok(operations.remove(index))
    }

    /// Mutate a different variable, resetting kind and operand if they no
    /// longer fit. Returns whether a reset happened.
    pub fn set_operation_variable(
        &mut self,
        at: ChoicePath,
        index: usize,
        variable: &Id,
    ) -> QwResult<bool> {
        let kind = self.variable_kind(variable)?;
        let operation = self.operation_mut(at, index)?;
        operation.variable_id = variable.clone();
        Ok(operation.reconcile(kind))
    }

    /// Change the operation kind. It must be available for the variable's type.
    pub fn set_operation_kind(
        &mut self,
        at: ChoicePath,
        index: usize,
        kind: OperationKind,
    ) -> QwResult<()> {
        let variable = &self.operation(at, index)?.variable_id;
        let value_kind = self.variable_kind(variable)?;
        if !kind.is_available_for(value_kind) {
            return Err(QwError::not_permitted(format!(
                "operation {kind} is not available for {value_kind} variables"
            )));
        }
        self.operation_mut(at, index)?.kind = kind;
        Ok(())
    }

    /// Change the operand. Its type must match the variable's.
    pub fn set_operation_value(
        &mut self,
        at: ChoicePath,
        index: usize,
        value: TypedValue,
    ) -> QwResult<()> {
        let variable = self.operation(at, index)?.variable_id.clone();
        let value = self.checked_value(&variable, value)?;
        self.operation_mut(at, index)?.value = value;
        Ok(())
    }
}

/// Reject NaN and infinities; they cannot be persisted.
pub(crate) fn finite(value: TypedValue) -> QwResult<TypedValue> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QwError::not_permitted(format!("{value} is not a finite number")))
    }
}
