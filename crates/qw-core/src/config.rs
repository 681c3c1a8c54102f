//! Configuration for an editing session.

use crate::defaults::DefaultTexts;

/// Configuration for an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Spaces per indentation level in the saved file (at most 8).
    pub indent: usize,
    /// Reject loaded chapters that break document invariants.
    pub validate_on_load: bool,
    /// Texts given to newly created entities.
    pub texts: DefaultTexts,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            validate_on_load: true,
            texts: DefaultTexts::default(),
        }
    }
}

impl EditorConfig {
    /// Set the indentation width (clamped to 0-8).
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.min(8);
        self
    }

    /// Enable or disable validation of loaded chapters.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_on_load = validate;
        self
    }

    /// Set the texts for new entities.
    pub fn with_texts(mut self, texts: DefaultTexts) -> Self {
        self.texts = texts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.indent, 2);
        assert!(cfg.validate_on_load);
        assert_eq!(cfg.texts.ending_text, "New ending");
    }

    #[test]
    fn builder_methods() {
        let texts = DefaultTexts {
            choice_text: "Go on".to_string(),
            ..DefaultTexts::default()
        };
        let cfg = EditorConfig::default()
            .with_indent(4)
            .with_validation(false)
            .with_texts(texts);
        assert_eq!(cfg.indent, 4);
        assert!(!cfg.validate_on_load);
        assert_eq!(cfg.texts.choice_text, "Go on");
    }

    #[test]
    fn indent_clamped() {
        assert_eq!(EditorConfig::default().with_indent(40).indent, 8);
    }
}
