use serde::Deserialize;

/// Parser configuration.
///
/// The default parses strictly and keeps text content verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParseOptions {
    /// Trim whitespace around text values. Text that trims to nothing is
    /// dropped, so the element stays empty.
    pub trim_text: bool,
    /// Maximum nesting depth. `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Capacity to reserve for the token buffer. `None` derives one from the
    /// input length.
    pub token_reserve: Option<usize>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim_text(mut self, trim_text: bool) -> Self {
        self.trim_text = trim_text;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_token_reserve(mut self, token_reserve: usize) -> Self {
        self.token_reserve = Some(token_reserve);
        self
    }
}
