use qw_core::Edit;

use super::Options;

pub fn run(opts: &Options, title: String) -> Result<(), String> {
    super::edit(opts, "chapter title", |_| Ok(Edit::SetChapterTitle { title }))
}
