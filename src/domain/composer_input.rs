//! Text state of the message composer input.

/// A span of the input measured in characters, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn caret(position: usize) -> Self {
        Self::new(position, position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerInput {
    text: String,
    /// Cursor position (character index, not byte).
    cursor_position: usize,
}

impl ComposerInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Replaces the whole content, clamping the cursor into it.
    pub fn set_content(&mut self, text: &str, cursor_position: usize) {
        self.text = text.to_owned();
        self.cursor_position = cursor_position.min(self.char_count());
    }

    /// Swaps `range` for `completion` and puts the cursor after it.
    ///
    /// Ranges reaching past the end are clamped to the text.
    pub fn apply_completion(&mut self, range: SelectionRange, completion: &str) {
        let char_count = self.char_count();
        let start = range.start.min(char_count);
        let end = range.end.min(char_count);

        let start_byte = self.char_to_byte_index(start);
        let end_byte = self.char_to_byte_index(end);
        self.text.replace_range(start_byte..end_byte, completion);
        self.cursor_position = start + completion.chars().count();
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}
