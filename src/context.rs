//! Cursor Context Extraction
//!
//! Captures a small, representation-agnostic fingerprint around a cursor
//! position: the word under the cursor and a bounded window of surrounding
//! characters. The fingerprint is what survives a representation switch, so
//! it must be computable from either the raw line text or a rendered block's
//! plain text.

/// Default number of characters captured on each side of the cursor.
pub const CONTEXT_WINDOW: usize = 10;

// ─────────────────────────────────────────────────────────────────────────────
// CursorContext
// ─────────────────────────────────────────────────────────────────────────────

/// The text fingerprint around a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CursorContext {
    /// The word containing or adjacent to the cursor
    pub word: String,
    /// Cursor offset from the start of `word`, in `0..=word.chars().count()`
    pub offset_in_word: usize,
    /// Up to [`CONTEXT_WINDOW`] raw characters before the cursor
    pub context_before: String,
    /// Up to [`CONTEXT_WINDOW`] raw characters after the cursor
    pub context_after: String,
}

impl CursorContext {
    /// A context with a usable search signal (either a word or enough
    /// surrounding characters).
    pub fn has_signal(&self) -> bool {
        !self.word.is_empty() || !self.context_before.is_empty() || !self.context_after.is_empty()
    }
}

/// Characters that belong to a word: Unicode letters and digits (which covers
/// the CJK ranges) plus underscore.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract the cursor fingerprint at character position `pos` in `text`.
///
/// The word boundary is the maximal run of word characters containing or
/// adjacent to `pos`: scan backward while the preceding character is a word
/// character, forward while the following one is. The context windows are the
/// raw characters immediately around `pos`, clamped to the text bounds.
///
/// Degenerate inputs (empty text, position past the end) yield an all-empty
/// context rather than failing.
pub fn extract_cursor_context(text: &str, pos: usize) -> CursorContext {
    extract_cursor_context_windowed(text, pos, CONTEXT_WINDOW)
}

/// [`extract_cursor_context`] with an explicit window size.
pub fn extract_cursor_context_windowed(text: &str, pos: usize, window: usize) -> CursorContext {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || pos > chars.len() {
        return CursorContext::default();
    }

    let mut start = pos;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = pos;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }

    let word: String = chars[start..end].iter().collect();
    let offset_in_word = pos - start;

    let before_start = pos.saturating_sub(window);
    let after_end = (pos + window).min(chars.len());
    let context_before: String = chars[before_start..pos].iter().collect();
    let context_after: String = chars[pos..after_end].iter().collect();

    CursorContext {
        word,
        offset_in_word,
        context_before,
        context_after,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
