use colored::Colorize;
use qw_core::query::shorten;
use qw_core::rule::{Condition, Operand, Operation};
use qw_core::{Chapter, Goto, Id};

use super::Options;

pub fn run(opts: &Options, branch: Option<usize>, rules: bool) -> Result<(), String> {
    let editor = super::open(opts)?;
    let chapter = editor.chapter();

    let shown = match branch {
        Some(index) => {
            chapter.branch_at(index).map_err(|e| e.to_string())?;
            index..index + 1
        }
        None => 0..chapter.branches.len(),
    };

    println!("  {}", chapter.title.bold());
    println!();

    for b in shown {
        let branch = &chapter.branches[b];
        println!(
            "  {} {} {}",
            b.to_string().dimmed(),
            branch.label().bold(),
            format!("[{}]", branch.id).dimmed()
        );

        for (s, segment) in branch.segments.iter().enumerate() {
            println!("    {} {}", format!("{b}.{s}").cyan(), shorten(&segment.text));
            if let Some(url) = &segment.image_url {
                println!("        {} {url}", "image:".dimmed());
            }
            for (c, choice) in segment.choices().iter().enumerate() {
                println!(
                    "      {} {} -> {}",
                    format!("{c}.").dimmed(),
                    choice.text,
                    target(chapter, &choice.goto)
                );
                if rules {
                    for condition in &choice.conditions {
                        println!("          if   {}", condition_text(chapter, condition));
                    }
                    for operation in &choice.operations {
                        println!("          then {}", operation_text(chapter, operation));
                    }
                }
            }
        }
        println!();
    }

    Ok(())
}

/// Where a goto leads, as `BRANCH.SEGMENT`.
fn target(chapter: &Chapter, goto: &Goto) -> String {
    match chapter.find_segment(&goto.segment_id) {
        Some(path) if chapter.resolves(goto) => path.to_string(),
        _ => format!("{goto} (missing)").red().to_string(),
    }
}

fn variable_name(chapter: &Chapter, id: &Id) -> String {
    chapter
        .variable(id)
        .map_or_else(|| format!("{id}?"), |v| v.name.clone())
}

fn condition_text(chapter: &Chapter, condition: &Condition) -> String {
    let right = match &condition.right {
        Operand::Constant(value) => value.to_string(),
        Operand::Variable(id) => variable_name(chapter, id),
    };
    format!(
        "{} {} {right}",
        variable_name(chapter, &condition.left),
        condition.comparator
    )
}

fn operation_text(chapter: &Chapter, operation: &Operation) -> String {
    format!(
        "{} {} {}",
        variable_name(chapter, &operation.variable_id),
        operation.kind,
        operation.value
    )
}
