//! Extraction options

/// Knobs for a single extraction pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Diagnostics beyond this count are dropped; `None` keeps all of them
    pub max_diagnostics: Option<usize>,
    /// Recognize trailing `#: T` assertions on single-line definitions
    pub trailing_assertions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_diagnostics: None,
            trailing_assertions: true,
        }
    }
}

impl ExtractOptions {
    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = Some(max);
        self
    }

    pub fn with_trailing_assertions(mut self, enabled: bool) -> Self {
        self.trailing_assertions = enabled;
        self
    }
}
