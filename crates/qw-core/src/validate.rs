//! Whole-document invariant checks.
//!
//! Edit operations keep a chapter valid on their own; validation is for data
//! that arrives from outside, i.e. loaded files.

use std::collections::HashSet;

use crate::chapter::{Chapter, ChoicePath, Goto};
use crate::id::Id;
use crate::rule::{Comparator, Operand, OperationKind};
use crate::value::ValueKind;

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    /// The chapter has no `@endings` branch.
    #[error("no {} branch", Id::ENDINGS)]
    MissingEndings,

    /// `@endings` exists but is not the last branch.
    #[error("{} is branch {index}, not the last one", Id::ENDINGS)]
    EndingsNotLast {
        /// Where it actually is.
        index: usize,
    },

    /// A branch has no segments.
    #[error("branch {0} has no segments")]
    EmptyBranch(Id),

    /// An ending carries options.
    #[error("ending {0} has options")]
    EndingWithOptions(Id),

    /// An ordinary segment has no options.
    #[error("segment {0} has no options")]
    MissingOptions(Id),

    /// An id is used more than once in its scope.
    #[error("duplicate {what} id {id}")]
    DuplicateId {
        /// `branch`, `segment` or `variable`.
        what: &'static str,
        /// The repeated id.
        id: Id,
    },

    /// A goto names a branch that does not exist.
    #[error("option {at} leads to unknown branch {}", goto.branch_id)]
    UnknownGotoBranch {
        /// The offending choice.
        at: ChoicePath,
        /// Its goto.
        goto: Goto,
    },

    /// A goto names a segment that is not in its branch.
    #[error("option {at} leads to segment {} outside branch {}", goto.segment_id, goto.branch_id)]
    SegmentNotInBranch {
        /// The offending choice.
        at: ChoicePath,
        /// Its goto.
        goto: Goto,
    },

    /// A condition or operation references a variable that does not exist.
    #[error("option {at} references unknown variable {variable}")]
    UnknownVariable {
        /// The offending choice.
        at: ChoicePath,
        /// The missing variable.
        variable: Id,
    },

    /// A comparator is not available for the tested variable's type.
    #[error("option {at} compares a {kind} variable with {comparator}")]
    ComparatorForType {
        /// The offending choice.
        at: ChoicePath,
        /// The comparator in use.
        comparator: Comparator,
        /// The variable's type.
        kind: ValueKind,
    },

    /// An operation kind is not available for the target variable's type.
    #[error("option {at} applies {operation} to a {kind} variable")]
    OperationForType {
        /// The offending choice.
        at: ChoicePath,
        /// The operation kind in use.
        operation: OperationKind,
        /// The variable's type.
        kind: ValueKind,
    },

    /// An operand's type does not match its variable's.
    #[error("option {at}: {variable} is {expected} but the operand is {found}")]
    OperandMismatch {
        /// The offending choice.
        at: ChoicePath,
        /// The variable the operand belongs to.
        variable: Id,
        /// The variable's type.
        expected: ValueKind,
        /// The operand's type.
        found: ValueKind,
    },
}

/// Check every document invariant, reporting all breaches in document order.
pub fn validate(chapter: &Chapter) -> Vec<Violation> {
    let mut found = Vec::new();
    check_structure(chapter, &mut found);
    check_ids(chapter, &mut found);
    check_choices(chapter, &mut found);
    found
}

fn check_structure(chapter: &Chapter, found: &mut Vec<Violation>) {
    match chapter.endings_index() {
        Err(_) => found.push(Violation::MissingEndings),
        Ok(index) if index + 1 != chapter.branches.len() => {
            found.push(Violation::EndingsNotLast { index });
        }
        Ok(_) => {}
    }

    for branch in &chapter.branches {
        if branch.segments.is_empty() {
            found.push(Violation::EmptyBranch(branch.id.clone()));
        }
        for segment in &branch.segments {
            if branch.is_endings() {
                if segment.options.is_some() {
                    found.push(Violation::EndingWithOptions(segment.id.clone()));
                }
            } else if segment.choices().is_empty() {
                found.push(Violation::MissingOptions(segment.id.clone()));
            }
        }
    }
}

fn check_ids(chapter: &Chapter, found: &mut Vec<Violation>) {
    duplicates("branch", chapter.branches.iter().map(|b| &b.id), found);
    duplicates(
        "segment",
        chapter
            .branches
            .iter()
            .flat_map(|b| b.segments.iter())
            .map(|s| &s.id),
        found,
    );
    duplicates("variable", chapter.variables.iter().map(|v| &v.id), found);
}

fn duplicates<'a>(
    what: &'static str,
    ids: impl Iterator<Item = &'a Id>,
    found: &mut Vec<Violation>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            found.push(Violation::DuplicateId {
                what,
                id: id.clone(),
            });
        }
    }
}

fn check_choices(chapter: &Chapter, found: &mut Vec<Violation>) {
    let kind_of = |id: &Id| chapter.variable(id).map(|v| v.kind());

    for (at, choice) in chapter.choices() {
        let goto = &choice.goto;
        match chapter.branch(&goto.branch_id) {
            None => found.push(Violation::UnknownGotoBranch {
                at,
                goto: goto.clone(),
            }),
            Some(branch) if branch.segment_index(&goto.segment_id).is_none() => {
                found.push(Violation::SegmentNotInBranch {
                    at,
                    goto: goto.clone(),
                });
            }
            Some(_) => {}
        }

        for condition in &choice.conditions {
            let Some(kind) = kind_of(&condition.left) else {
                found.push(Violation::UnknownVariable {
                    at,
                    variable: condition.left.clone(),
                });
                continue;
            };
            if !condition.comparator.is_available_for(kind) {
                found.push(Violation::ComparatorForType {
                    at,
                    comparator: condition.comparator,
                    kind,
                });
            }
            let operand = match &condition.right {
                Operand::Constant(value) => Some(value.kind()),
                Operand::Variable(id) => {
                    let operand = kind_of(id);
                    if operand.is_none() {
                        found.push(Violation::UnknownVariable {
                            at,
                            variable: id.clone(),
                        });
                    }
                    operand
                }
            };
            if let Some(operand) = operand.filter(|o| *o != kind) {
                found.push(Violation::OperandMismatch {
                    at,
                    variable: condition.left.clone(),
                    expected: kind,
                    found: operand,
                });
            }
        }

        for operation in &choice.operations {
            let Some(kind) = kind_of(&operation.variable_id) else {
                found.push(Violation::UnknownVariable {
                    at,
                    variable: operation.variable_id.clone(),
                });
                continue;
            };
            if !operation.kind.is_available_for(kind) {
                found.push(Violation::OperationForType {
                    at,
                    operation: operation.kind,
                    kind,
                });
            }
            if !operation.value.is(kind) {
                found.push(Violation::OperandMismatch {
                    at,
                    variable: operation.variable_id.clone(),
                    expected: kind,
                    found: operation.value.kind(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter::Branch;
    use crate::defaults::Factory;
    use crate::rule::{Condition, Operation};
    use crate::value::TypedValue;
    use crate::variable::Variable;

    fn chapter() -> Chapter {
        Factory::sequential().chapter()
    }

    const AT: ChoicePath = ChoicePath {
        branch: 0,
        segment: 0,
        choice: 0,
    };

    #[test]
    fn generated_chapter_is_valid() {
        assert!(validate(&chapter()).is_empty());
    }

    #[test]
    fn endings_missing_or_misplaced() {
        let mut c = chapter();
        c.branches.swap(0, 1);
        assert!(validate(&c).contains(&Violation::EndingsNotLast { index: 0 }));

        c.branches.remove(0);
        assert!(validate(&c).contains(&Violation::MissingEndings));
    }

    #[test]
    fn structural_breaches() {
        let mut c = chapter();
        c.branches[0].segments[0].options = Some(Vec::new());
        c.branches[1].segments[0].options = Some(Vec::new());
        c.branches
            .insert(1, Branch::new(Id::new("hollow"), "Hollow", Vec::new()));

        let found = validate(&c);
        assert!(found.contains(&Violation::MissingOptions(Id::new("id-2"))));
        assert!(found.contains(&Violation::EmptyBranch(Id::new("hollow"))));
        // Endings carry no options list at all, not even an empty one.
        assert!(found.contains(&Violation::EndingWithOptions(Id::new("id-3"))));
    }

    #[test]
    fn ending_with_options() {
        let mut c = chapter();
        let stray = c.branches[0].segments[0].choices().to_vec();
        c.branches[1].segments[0].options = Some(stray);
        assert_eq!(
            validate(&c),
            vec![Violation::EndingWithOptions(Id::new("id-3"))]
        );
    }

    #[test]
    fn duplicate_segment_ids_across_branches() {
        let mut c = chapter();
        c.branches[1].segments[0].id = Id::new("id-2");
        assert!(validate(&c).contains(&Violation::DuplicateId {
            what: "segment",
            id: Id::new("id-2"),
        }));
    }

    #[test]
    fn dangling_gotos() {
        let mut c = chapter();
        let choice = c.branches[0].segments[0].choices()[0].clone();
        c.branches[0].segments[0].options = Some(vec![choice.clone(), choice]);
        let options = c.branches[0].segments[0].options.get_or_insert_with(Vec::new);
        options[0].goto = Goto::new(Id::new("gone"), Id::new("id-2"));
        options[1].goto = Goto::new(Id::new("id-1"), Id::new("id-3"));

        let found = validate(&c);
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0], Violation::UnknownGotoBranch { .. }));
        assert!(matches!(
            found[1],
            Violation::SegmentNotInBranch {
                at: ChoicePath {
                    choice: 1,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn rule_breaches() {
        let mut c = chapter();
        let flag = Variable::new(Id::new("flag"), "flag", TypedValue::Bool(false));
        let gold = Variable::new(Id::new("gold"), "gold", TypedValue::Number(0.0));
        let mut bad_cmp = Condition::for_variable(&flag);
        bad_cmp.comparator = Comparator::Less;
        let mut cross = Condition::for_variable(&flag);
        cross.right = Operand::Variable(gold.id.clone());
        let mut bad_op = Operation::for_variable(&flag);
        bad_op.kind = OperationKind::Add;
        let mut bad_value = Operation::for_variable(&gold);
        bad_value.value = TypedValue::Bool(true);
        let ghost = Operation::for_variable(&Variable::new(
            Id::new("ghost"),
            "ghost",
            TypedValue::Bool(true),
        ));
        c.variables = vec![flag, gold];

        let options = c.branches[0].segments[0].options.get_or_insert_with(Vec::new);
        options[0].conditions = vec![bad_cmp, cross];
        options[0].operations = vec![bad_op, bad_value, ghost];

        let found = validate(&c);
        assert_eq!(
            found,
            vec![
                Violation::ComparatorForType {
                    at: AT,
                    comparator: Comparator::Less,
                    kind: ValueKind::Bool,
                },
                Violation::OperandMismatch {
                    at: AT,
                    variable: Id::new("flag"),
                    expected: ValueKind::Bool,
                    found: ValueKind::Number,
                },
                Violation::OperationForType {
                    at: AT,
                    operation: OperationKind::Add,
                    kind: ValueKind::Bool,
                },
                Violation::OperandMismatch {
                    at: AT,
                    variable: Id::new("gold"),
                    expected: ValueKind::Number,
                    found: ValueKind::Bool,
                },
                Violation::UnknownVariable {
                    at: AT,
                    variable: Id::new("ghost"),
                },
            ]
        );
    }

    #[test]
    fn violations_render() {
        let v = Violation::DuplicateId {
            what: "branch",
            id: Id::new("b"),
        };
        assert_eq!(v.to_string(), "duplicate branch id b");
        assert_eq!(Violation::MissingEndings.to_string(), "no @endings branch");
    }
}
