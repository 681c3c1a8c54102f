use std::fs;

use colored::Colorize;
use qw_core::{storage, validate};

use super::Options;

pub fn run(opts: &Options) -> Result<(), String> {
    let bytes = fs::read(opts.file)
        .map_err(|e| format!("cannot read {}: {e}", opts.file.display()))?;
    let chapter = storage::parse(&bytes).map_err(|e| e.to_string())?;
    let violations = validate(&chapter);

    if violations.is_empty() {
        println!("  All checks passed for '{}'.", chapter.title);
        println!(
            "  {} branches, {} segments, {} options, {} variables",
            chapter.branches.len(),
            chapter.segment_count(),
            chapter.choice_count(),
            chapter.variables.len()
        );
        return Ok(());
    }

    for violation in &violations {
        eprintln!("  {} {violation}", "error:".red().bold());
    }
    let count = violations.len();
    Err(format!(
        "{count} violation{}",
        if count == 1 { "" } else { "s" }
    ))
}
