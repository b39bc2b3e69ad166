/// Keys the composer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerKey {
    /// Submit the draft
    Enter,
    /// Insert a literal newline into the draft
    ShiftEnter,
}

/// Draft text being composed by the user
#[derive(Debug, Clone, Default)]
pub struct Composer {
    draft: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.draft
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    /// Replace the draft
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Append typed text to the draft
    pub fn push_str(&mut self, text: &str) {
        self.draft.push_str(text);
    }

    pub fn insert_newline(&mut self) {
        self.draft.push('\n');
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }
}
