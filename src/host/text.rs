//! Line/character positions over document text.
//!
//! Positions count characters, not bytes, so columns stay meaningful for
//! multi-byte text like `ø`, `中` or `🎉`. Conversions clamp out-of-range
//! positions instead of panicking, the way an editor clamps a selection.

// ─────────────────────────────────────────────────────────────────────────────
// Position & Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A zero-based line/character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A selection between two positions, `start <= end` after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    /// Create a selection, ordering the two positions.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Select a whole document: start of the first line to the start of the
    /// line after the last one.
    pub fn whole_document(line_count: usize) -> Self {
        Self::new(Position::new(0, 0), Position::new(line_count, 0))
    }

    /// Whether the selection covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

/// Number of lines in a text; an empty text still has one line.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Convert a character index within a line to a byte index.
///
/// Returns the line length if `char_index` is beyond the line.
fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Byte offset of a position, clamped to the text.
///
/// A line past the end maps to the end of the text; a character past the end
/// of its line maps to the end of that line (before the newline).
pub fn offset_at(text: &str, position: Position) -> usize {
    let mut line_start = 0;
    for (index, line) in text.split('\n').enumerate() {
        if index == position.line {
            let line = line.strip_suffix('\r').unwrap_or(line);
            return line_start + char_index_to_byte_index(line, position.character);
        }
        line_start += line.len() + 1;
    }
    text.len()
}

/// The text covered by a selection.
pub fn text_in_range(text: &str, selection: Selection) -> &str {
    let start = offset_at(text, selection.start);
    let end = offset_at(text, selection.end).max(start);
    &text[start..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
