use comfy_table::{ContentArrangement, Table};
use qw_core::{Chapter, Id};

use super::Options;

pub fn run(opts: &Options) -> Result<(), String> {
    let editor = super::open(opts)?;
    let chapter = editor.chapter();

    if chapter.variables.is_empty() {
        println!("  No variables.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Name", "Type", "Initial", "Uses", "Id"]);

    for (index, variable) in chapter.variables.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            variable.name.clone(),
            variable.kind().to_string(),
            variable.initial_value.to_string(),
            uses(chapter, &variable.id).to_string(),
            variable.id.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} variables", chapter.variables.len());

    Ok(())
}

/// Conditions and operations referring to a variable.
fn uses(chapter: &Chapter, id: &Id) -> usize {
    chapter
        .choices()
        .map(|(_, choice)| {
            choice.conditions.iter().filter(|c| c.references(id)).count()
                + choice
                    .operations
                    .iter()
                    .filter(|o| o.variable_id == *id)
                    .count()
        })
        .sum()
}
