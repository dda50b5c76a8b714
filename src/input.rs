/*!
 * Input buffer and character-count feedback.
 */

/// Character count above which the input is flagged as possibly too long for the model
pub const DEFAULT_CHARACTER_LIMIT: usize = 4000;

/// Snapshot of the counter shown next to the input region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterCount {
    /// Number of characters (Unicode scalar values) in the buffer
    pub count: usize,
    /// Whether the count is above the limit; never blocks submission
    pub over_limit: bool,
}

/// The raw text the user is editing
#[derive(Debug, Clone)]
pub struct InputBuffer {
    text: String,
    character_limit: usize,
}

impl InputBuffer {
    pub fn new(character_limit: usize) -> Self {
        Self {
            text: String::new(),
            character_limit,
        }
    }

    /// Replace the whole buffer with the current contents of the input region
    pub fn set_text(&mut self, text: impl Into<String>) -> CharacterCount {
        self.text = text.into();
        self.character_count()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn character_count(&self) -> CharacterCount {
        let count = self.text.chars().count();
        CharacterCount {
            count,
            over_limit: count > self.character_limit,
        }
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CHARACTER_LIMIT)
    }
}
