//! Greedy caption wrapping
//!
//! Widths are counted in characters, not glyph advances. Words are never
//! split; a word longer than the line width sits alone on its own line.

/// Hard cap on caption lines. Text that would need more lines is dropped.
pub const MAX_LINES: usize = 3;

/// Wrapped caption, at most [`MAX_LINES`] lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WrappedText {
    lines: Vec<String>,
}

impl WrappedText {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines joined with `\n`, ready for a multi-line text annotation.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Pack the words of `text` greedily into lines of at most
/// `max_chars_per_line` characters, keeping only the first three lines.
pub fn wrap(text: &str, max_chars_per_line: usize) -> WrappedText {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        if current.chars().count() + 1 + word.chars().count() <= max_chars_per_line {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            if lines.len() == MAX_LINES {
                break;
            }
            current.push_str(word);
        }
    }

    if !current.is_empty() && lines.len() < MAX_LINES {
        lines.push(current);
    }

    WrappedText { lines }
}
