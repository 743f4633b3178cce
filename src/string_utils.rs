//! UTF-8 Safe String Utilities
//!
//! Cursor positions in this crate are *character* offsets, because that is
//! what the editing surfaces report. Rust strings are UTF-8 encoded byte
//! buffers, so every place that slices or searches text needs a careful
//! conversion between the two units.
//!
//! # Problem
//! Characters like `ø`, `æ`, `å`, `中`, `🎉` are multi-byte in UTF-8.
//! If you try `text[5..10]` and index 5 or 10 falls inside a multi-byte
//! character, Rust panics.
//!
//! # Solution
//! Keep char offsets at the API surface and convert to byte indices only at
//! the point of slicing, via the helpers in this module.

// ─────────────────────────────────────────────────────────────────────────────
// Char/Byte Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in a string.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character offset to a byte offset.
///
/// Offsets past the end of the string clamp to the string's byte length.
#[inline]
pub fn char_to_byte(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Convert a byte offset to a character offset.
///
/// The byte offset must lie on a character boundary; offsets past the end of
/// the string clamp to the string's character length.
#[inline]
pub fn byte_to_char(s: &str, byte_index: usize) -> usize {
    if byte_index >= s.len() {
        return char_len(s);
    }
    s[..byte_index].chars().count()
}

/// Slice a string by character offsets.
///
/// Out-of-range offsets clamp to the string bounds; an inverted range yields
/// an empty string.
pub fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    let start = char_to_byte(s, start);
    let end = char_to_byte(s, end);
    if start >= end {
        return "";
    }
    &s[start..end]
}

// ─────────────────────────────────────────────────────────────────────────────
// Line/Column Addressing
// ─────────────────────────────────────────────────────────────────────────────

/// Split a buffer into lines, keeping empty lines (including a trailing one).
///
/// `str::lines` drops a trailing empty line, which would make offsets at the
/// very end of a buffer unaddressable.
#[inline]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Convert a character index to (line, column) position.
///
/// Both line and column are 0-indexed.
pub fn char_index_to_line_col(text: &str, char_index: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;

    for (i, ch) in text.chars().enumerate() {
        if i >= char_index {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert (line, column) position to a character index.
///
/// Both line and column are 0-indexed.
/// Returns the closest valid index if position is out of bounds.
pub fn line_col_to_char_index(text: &str, line: usize, col: usize) -> usize {
    let mut current_line = 0;
    let mut current_col = 0;

    for (i, ch) in text.chars().enumerate() {
        if current_line == line && current_col == col {
            return i;
        }
        if ch == '\n' {
            if current_line == line {
                // Reached end of target line before reaching column
                return i;
            }
            current_line += 1;
            current_col = 0;
        } else if current_line == line {
            current_col += 1;
        }
    }

    // Return end of text if position is beyond
    text.chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
