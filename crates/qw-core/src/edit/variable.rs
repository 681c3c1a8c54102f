use tracing::{debug, info};

use super::repair::CascadeReport;
use super::rule::finite;
use super::{insert_position, shift};
use crate::chapter::Chapter;
use crate::defaults::Factory;
use crate::error::{QwError, QwResult};
use crate::id::Id;
use crate::value::{TypedValue, ValueKind};
use crate::variable::Variable;

impl Chapter {
    /// Insert a variable of the given type, initialised to its zero value.
    pub fn add_variable(
        &mut self,
        kind: ValueKind,
        after: Option<usize>,
        factory: &mut Factory,
    ) -> QwResult<usize> {
        let position = insert_position("variable", after, self.variables.len())?;
        let id = factory.fresh_id(self);
        debug!(%id, %kind, position, "adding variable");
        self.variables.insert(position, factory.variable(id, kind));
        Ok(position)
    }

    /// Swap a variable with its neighbour.
    pub fn move_variable(&mut self, index: usize, delta: isize) -> QwResult<usize> {
        shift(&mut self.variables, "variable", index, delta)
    }

    /// Remove a variable together with every condition and operation using it.
    pub fn delete_variable(&mut self, id: &Id) -> QwResult<(Variable, CascadeReport)> {
        let index = self
            .variable_index(id)
            .ok_or_else(|| QwError::VariableNotFound(id.clone()))?;
        let removed = self.variables.remove(index);
        let report = self.cascade_variable(id);
        info!(
            %id,
            conditions = report.conditions_removed,
            operations = report.operations_removed,
            "deleted variable"
        );
        Ok((removed, report))
    }

    /// Rename a variable.
    pub fn rename_variable(&mut self, id: &Id, name: impl Into<String>) -> QwResult<()> {
        self.variable_mut(id)?.name = name.into();
        Ok(())
    }

    /// Change a variable's initial value, keeping its type. Numbers must be
    /// finite.
    pub fn set_variable_initial_value(&mut self, id: &Id, value: TypedValue) -> QwResult<()> {
        let variable = self.variable_mut(id)?;
        if !value.is(variable.kind()) {
            return Err(QwError::TypeMismatch {
                expected: variable.kind(),
                found: value.kind(),
            });
        }
        variable.initial_value = finite(value)?;
        Ok(())
    }

    fn variable_mut(&mut self, id: &Id) -> QwResult<&mut Variable> {
        self.variables
            .iter_mut()
            .find(|v| v.id == *id)
            .ok_or_else(|| QwError::VariableNotFound(id.clone()))
    }
}
