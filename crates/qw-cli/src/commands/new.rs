use std::fs;

use qw_core::{Editor, FileStorage, UuidIds};

use super::Options;

pub fn run(opts: &Options) -> Result<(), String> {
    let file = opts.file;
    if fs::metadata(file).is_ok_and(|m| m.len() > 0) {
        return Err(format!("'{}' already exists", file.display()));
    }

    let storage = FileStorage::open(file).map_err(|e| e.to_string())?;
    let editor = Editor::open(storage, UuidIds, opts.config()).map_err(|e| e.to_string())?;
    let chapter = editor.chapter();

    println!("  Created chapter '{}' in {}", chapter.title, file.display());
    println!(
        "  {} branches, {} segments, {} options",
        chapter.branches.len(),
        chapter.segment_count(),
        chapter.choice_count()
    );

    Ok(())
}
