pub mod branch;
pub mod check;
pub mod choice;
pub mod condition;
pub mod new;
pub mod operation;
pub mod segment;
pub mod show;
pub mod title;
pub mod variable;
pub mod variables;

use std::io::{self, BufRead, Write};
use std::path::Path;

use qw_core::rule::{Comparator, OperationKind};
use qw_core::{
    AlwaysYes, Chapter, ChoicePath, Edit, EditOutcome, Editor, EditorConfig, FileStorage, Id,
    QwError, SegmentPath, TypedValue, UuidIds, ValueKind,
};

/// Settings shared by every command.
pub struct Options<'a> {
    pub file: &'a Path,
    pub yes: bool,
    pub indent: Option<usize>,
}

impl Options<'_> {
    fn config(&self) -> EditorConfig {
        let config = EditorConfig::default();
        match self.indent {
            Some(indent) => config.with_indent(indent),
            None => config,
        }
    }
}

/// Open an existing chapter file for editing.
fn open(opts: &Options) -> Result<Editor<FileStorage>, String> {
    if !opts.file.is_file() {
        return Err(format!(
            "chapter file not found: {} (create one with `qw new`)",
            opts.file.display()
        ));
    }
    let storage = FileStorage::open(opts.file).map_err(|e| e.to_string())?;
    Editor::open(storage, UuidIds, opts.config()).map_err(|e| match e {
        QwError::Invalid(_) => format!("{e}; run `qw check` for details"),
        e => e.to_string(),
    })
}

/// Open the chapter, apply the edit built from it, and save.
///
/// Destructive edits prompt on stdin unless `--yes` was given.
fn apply(
    opts: &Options,
    build: impl FnOnce(&Chapter) -> Result<Edit, String>,
) -> Result<EditOutcome, String> {
    let mut editor = open(opts)?;
    let edit = build(editor.chapter())?;
    let outcome = if opts.yes {
        editor.apply(edit, &mut AlwaysYes)
    } else {
        editor.apply(edit, &mut ask)
    }
    .map_err(|e| e.to_string())?;

    if editor.is_dirty() {
        editor.save().map_err(|e| e.to_string())?;
    }
    Ok(outcome)
}

/// Apply an edit and print what happened to `what`.
fn edit(
    opts: &Options,
    what: &str,
    build: impl FnOnce(&Chapter) -> Result<Edit, String>,
) -> Result<(), String> {
    let outcome = apply(opts, build)?;
    report(&outcome, what);
    Ok(())
}

fn report(outcome: &EditOutcome, what: &str) {
    match outcome {
        EditOutcome::Inserted(index) => println!("  Added {what} at index {index}."),
        EditOutcome::Moved(index) => println!("  Moved {what} to index {index}."),
        EditOutcome::Removed => println!("  Deleted {what}."),
        EditOutcome::VariableRemoved(cascade) => {
            println!("  Deleted {what}.");
            if !cascade.is_empty() {
                println!(
                    "  Also removed {} condition(s) and {} operation(s) using it.",
                    cascade.conditions_removed, cascade.operations_removed
                );
            }
        }
        EditOutcome::Retargeted(goto) => println!("  The {what} now leads to {goto}."),
        EditOutcome::Updated => println!("  Updated {what}."),
        EditOutcome::Declined => println!("  Cancelled, nothing changed."),
    }
}

fn ask(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ---------------------------------------------------------------------------
// Argument parsers
// ---------------------------------------------------------------------------

fn indices(s: &str) -> Result<Vec<usize>, String> {
    s.split('.')
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| format!("'{part}' is not an index"))
        })
        .collect()
}

/// Parse `BRANCH.SEGMENT`, e.g. `0.2`.
pub fn parse_segment_path(s: &str) -> Result<SegmentPath, String> {
    match indices(s)?[..] {
        [branch, segment] => Ok(SegmentPath::new(branch, segment)),
        _ => Err(format!("expected BRANCH.SEGMENT, got '{s}'")),
    }
}

/// Parse `BRANCH.SEGMENT.OPTION`, e.g. `0.2.1`.
pub fn parse_choice_path(s: &str) -> Result<ChoicePath, String> {
    match indices(s)?[..] {
        [branch, segment, choice] => Ok(ChoicePath::new(branch, segment, choice)),
        _ => Err(format!("expected BRANCH.SEGMENT.OPTION, got '{s}'")),
    }
}

/// Parse `true`, `false` or a finite number.
pub fn parse_value(s: &str) -> Result<TypedValue, String> {
    match s {
        "true" => Ok(TypedValue::Bool(true)),
        "false" => Ok(TypedValue::Bool(false)),
        _ => s
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(TypedValue::Number)
            .ok_or_else(|| format!("expected true, false or a finite number, got '{s}'")),
    }
}

/// Parse a variable type.
pub fn parse_value_kind(s: &str) -> Result<ValueKind, String> {
    match s {
        "bool" | "boolean" => Ok(ValueKind::Bool),
        "number" => Ok(ValueKind::Number),
        _ => Err(format!("expected bool or number, got '{s}'")),
    }
}

/// Parse a comparator by symbol (`>=`) or name (`greater_or_equal`).
pub fn parse_comparator(s: &str) -> Result<Comparator, String> {
    let named = match s {
        "equal" => Some(Comparator::Equal),
        "not_equal" => Some(Comparator::NotEqual),
        "greater" => Some(Comparator::Greater),
        "greater_or_equal" => Some(Comparator::GreaterOrEqual),
        "less" => Some(Comparator::Less),
        "less_or_equal" => Some(Comparator::LessOrEqual),
        _ => None,
    };
    named
        .or_else(|| Comparator::ALL.into_iter().find(|c| c.symbol() == s))
        .ok_or_else(|| {
            let symbols: Vec<_> = Comparator::ALL.iter().map(|c| c.symbol()).collect();
            format!("unknown comparator '{s}' (one of {})", symbols.join(" "))
        })
}

/// Parse an operation kind by symbol (`+=`) or name (`add`).
pub fn parse_operation_kind(s: &str) -> Result<OperationKind, String> {
    let named = match s {
        "set" => Some(OperationKind::Set),
        "add" => Some(OperationKind::Add),
        "subtract" => Some(OperationKind::Subtract),
        "multiply" => Some(OperationKind::Multiply),
        "divide" => Some(OperationKind::Divide),
        _ => None,
    };
    named
        .or_else(|| OperationKind::ALL.into_iter().find(|k| k.symbol() == s))
        .ok_or_else(|| {
            let symbols: Vec<_> = OperationKind::ALL.iter().map(|k| k.symbol()).collect();
            format!("unknown operation '{s}' (one of {})", symbols.join(" "))
        })
}

/// Resolve a variable given by id or by name.
///
/// Unknown references pass through unchanged so the edit reports them.
fn variable_id(chapter: &Chapter, reference: &str) -> Id {
    let id = Id::new(reference);
    if chapter.variable(&id).is_some() {
        return id;
    }
    chapter
        .variables
        .iter()
        .find(|v| v.name == reference)
        .map_or(id, |v| v.id.clone())
}
