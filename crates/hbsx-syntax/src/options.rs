use hbsx_tokenizer::TokenizerMode;

/// How the HTML half of a template is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Decode character references and apply browser newline rules.
    #[default]
    Precompile,
    /// Keep all text exactly as written, for source-to-source tools.
    Codemod,
}

impl From<ParseMode> for TokenizerMode {
    fn from(mode: ParseMode) -> Self {
        match mode {
            ParseMode::Precompile => TokenizerMode::Precompile,
            ParseMode::Codemod => TokenizerMode::Codemod,
        }
    }
}

/// Options for [`preprocess`](crate::preprocess).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Shown in error messages.
    pub module_name: Option<String>,
    /// Names in scope for the whole template; they become the template's
    /// block parameters.
    pub locals: Vec<String>,
    pub mode: ParseMode,
    /// Keep the lines around standalone block tags, comments and partials.
    pub ignore_standalone: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    pub fn with_locals<I, S>(mut self, locals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locals = locals.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ignore_standalone(mut self, ignore: bool) -> Self {
        self.ignore_standalone = ignore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let options = ParseOptions::new()
            .with_module_name("card")
            .with_locals(["user", "theme"])
            .with_mode(ParseMode::Codemod)
            .with_ignore_standalone(true);
        assert_eq!(options.module_name.as_deref(), Some("card"));
        assert_eq!(options.locals, vec!["user", "theme"]);
        assert_eq!(options.mode, ParseMode::Codemod);
        assert!(options.ignore_standalone);
    }

    #[test]
    fn test_mode_maps_to_tokenizer() {
        assert_eq!(TokenizerMode::from(ParseMode::default()), TokenizerMode::Precompile);
        assert_eq!(TokenizerMode::from(ParseMode::Codemod), TokenizerMode::Codemod);
    }
}
