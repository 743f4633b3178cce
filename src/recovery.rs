//! Position Recovery Engine
//!
//! Given a cursor fingerprint and a target line, relocate the closest
//! matching offset in the target text. This is the algorithmic core of the
//! crate: markdown syntax is stripped and re-inserted between the two
//! representations, whitespace and escaping vary, and duplicate content
//! defeats naive search, so recovery is a priority cascade that stops at the
//! first signal strong enough to trust:
//!
//! 1. **Context match** — the concatenated before/after window, searched in
//!    the format-stripped text of the target line and its neighbors.
//! 2. **Word match** — the word under the cursor, searched first in the
//!    original line, then in the stripped line with the hit remapped back.
//! 3. **Percentage fallback** — proportional placement, for clicks in
//!    whitespace or newly-inserted content.
//!
//! The stripped→original remapping is a best-effort approximation, not a
//! formal inverse; it is kept behind the single
//! [`map_stripped_to_original`] seam so a span-tracking transform could
//! replace it without touching callers.

use log::debug;
use regex::Regex;
use std::sync::OnceLock;

use crate::classify::strip_inline_formatting;
use crate::config::SyncConfig;
use crate::context::CursorContext;
use crate::string_utils::{byte_to_char, char_len};

// ─────────────────────────────────────────────────────────────────────────────
// LinePosition
// ─────────────────────────────────────────────────────────────────────────────

/// A recovered cursor position: line index plus character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePosition {
    /// 0-indexed line
    pub line: usize,
    /// 0-indexed character column within the line
    pub column: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Recovery Cascade
// ─────────────────────────────────────────────────────────────────────────────

/// Relocate a cursor near `target_line` using the priority cascade.
///
/// Lines at offsets 0, -1, +1, -2, +2 from the target are searched in that
/// order (nearest first). The percentage fallback never fails; the returned
/// column is always within the chosen line.
pub fn find_best_position(
    lines: &[&str],
    target_line: usize,
    context: &CursorContext,
    percent_in_line: f32,
    config: &SyncConfig,
) -> LinePosition {
    if lines.is_empty() {
        return LinePosition { line: 0, column: 0 };
    }
    let target_line = target_line.min(lines.len() - 1);
    let offsets = config.search_offsets();

    // 1. Context match. A pattern shorter than the minimum is too weak a
    // signal to be worth a false positive.
    let pattern = format!("{}{}", context.context_before, context.context_after);
    if char_len(&pattern) >= config.min_context_len {
        for &delta in &offsets {
            let Some(line) = offset_line(lines, target_line, delta) else {
                continue;
            };
            let original = lines[line];
            let stripped = strip_inline_formatting(original);
            if let Some(byte_idx) = stripped.find(&pattern) {
                let stripped_col =
                    byte_to_char(&stripped, byte_idx) + char_len(&context.context_before);
                let column = map_stripped_to_original(original, stripped_col);
                return LinePosition { line, column };
            }
        }
    }

    // 2. Word match: original line first, then the stripped line remapped.
    if !context.word.is_empty() {
        for &delta in &offsets {
            let Some(line) = offset_line(lines, target_line, delta) else {
                continue;
            };
            let original = lines[line];
            if let Some(byte_idx) = original.find(&context.word) {
                let column = byte_to_char(original, byte_idx) + context.offset_in_word;
                return LinePosition { line, column };
            }
            let stripped = strip_inline_formatting(original);
            if let Some(byte_idx) = stripped.find(&context.word) {
                let stripped_col = byte_to_char(&stripped, byte_idx) + context.offset_in_word;
                let column = map_stripped_to_original(original, stripped_col);
                return LinePosition { line, column };
            }
        }
    }

    // 3. Percentage fallback.
    debug!(
        "no context/word match near line {}; using percentage fallback",
        target_line
    );
    let line_len = char_len(lines[target_line]);
    let column = (percent_in_line.clamp(0.0, 1.0) * line_len as f32).round() as usize;
    LinePosition {
        line: target_line,
        column: column.min(line_len),
    }
}

/// Resolve `target + delta` to a valid line index.
fn offset_line(lines: &[&str], target: usize, delta: isize) -> Option<usize> {
    let line = target as isize + delta;
    if line < 0 || line as usize >= lines.len() {
        return None;
    }
    Some(line as usize)
}

// ─────────────────────────────────────────────────────────────────────────────
// Stripped → Original Remapping
// ─────────────────────────────────────────────────────────────────────────────

/// A formatting construct recognized by the remapping walk.
struct MarkerPattern {
    re: Regex,
    /// Characters between the construct start and its rendered text
    prefix: usize,
    /// Whether capture group 1 holds the rendered text (footnotes render to
    /// nothing and have no group)
    has_label: bool,
}

/// Ordered marker list; wider constructs first so nested syntax is not
/// mis-parsed.
fn marker_patterns() -> &'static [MarkerPattern] {
    static PATTERNS: OnceLock<Vec<MarkerPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^!\[([^\]]*)\]\([^)]*\)", 2, true), // image
            (r"^\[\^[^\]\s]+\]", 0, false),        // footnote reference
            (r"^\[([^\]]*)\]\([^)]*\)", 1, true),  // link
            (r"^\*\*([^*]+)\*\*", 2, true),        // bold
            (r"^__([^_]+)__", 2, true),            // bold (underscore)
            (r"^~~([^~]+)~~", 2, true),            // strikethrough
            (r"^\*([^*]+)\*", 1, true),            // italic
            (r"^_([^_]+)_", 1, true),              // italic (underscore)
            (r"^`([^`]+)`", 1, true),              // inline code
            (r"^\$([^$\n]+)\$", 1, true),          // inline math
        ]
        .into_iter()
        .map(|(pattern, prefix, has_label)| MarkerPattern {
            re: Regex::new(pattern).expect("hard-coded pattern"),
            prefix,
            has_label,
        })
        .collect()
    })
}

/// Map an offset in format-stripped text back to the original line.
///
/// Walks the original line left to right. When a formatting construct
/// matches at the walk position, its stripped contribution is its rendered
/// text (a link contributes its label, not the full `[label](url)` span); the
/// walk advances past the whole construct. Non-marker characters contribute
/// themselves. The walk stops once enough stripped characters have been
/// consumed; a target inside a construct's rendered text lands inside the
/// construct. Targets past the stripped length map to the end of the line.
pub fn map_stripped_to_original(original: &str, stripped_offset: usize) -> usize {
    let mut byte_pos = 0;
    let mut orig_chars = 0;
    let mut stripped_chars = 0;

    'walk: while byte_pos < original.len() {
        if stripped_chars >= stripped_offset {
            return orig_chars;
        }

        let rest = &original[byte_pos..];
        for marker in marker_patterns() {
            if let Some(caps) = marker.re.captures(rest) {
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or("");
                let rendered = if marker.has_label {
                    caps.get(1).map(|m| m.as_str()).unwrap_or("")
                } else {
                    ""
                };
                let rendered_len = char_len(rendered);

                if stripped_chars + rendered_len >= stripped_offset {
                    // Target falls inside this construct's rendered text
                    let into = stripped_offset - stripped_chars;
                    return orig_chars + marker.prefix + into;
                }

                byte_pos += whole.len();
                orig_chars += char_len(whole);
                stripped_chars += rendered_len;
                continue 'walk;
            }
        }

        // Plain character: contributes itself to both sides
        let ch = rest.chars().next().unwrap_or('\0');
        byte_pos += ch.len_utf8();
        orig_chars += 1;
        stripped_chars += 1;
    }

    orig_chars
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
