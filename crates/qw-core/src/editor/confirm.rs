//! Yes/no prompts for destructive edits.

/// Asks the user whether a destructive edit should go ahead.
pub trait Confirm {
    /// Show `prompt` and return the answer.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers every prompt with yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Answers every prompt with no.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysNo;

impl Confirm for AlwaysNo {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}
