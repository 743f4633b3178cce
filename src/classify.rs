//! Line/Block Classification
//!
//! This module labels a single line of raw markdown with the structural type
//! it would parse to, tracks multi-line code-fence spans, and strips markdown
//! syntax (leading block markers and inline formatting) from line text. The
//! classification is context-free: it looks at one line at a time, except for
//! the fence-span scan which walks the preceding lines.
//!
//! Stripping is used to compare cursor fingerprints across the raw and
//! rendered representations, where the same content differs only by syntax.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Node Type
// ─────────────────────────────────────────────────────────────────────────────

/// The structural type of a markdown line.
///
/// Derived purely from the leading syntax of the line; variants are mutually
/// exclusive in classification order. An alert is a specialized blockquote and
/// is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// ATX heading (`#` through `######`)
    Heading,
    /// Bullet or ordered list item
    ListItem,
    /// Fenced code block
    CodeBlock,
    /// GitHub-style alert (`> [!NOTE]` etc.)
    AlertBlock,
    /// Plain blockquote (`>`)
    Blockquote,
    /// Details/collapsible block (`::: details` or `<details>`)
    DetailsBlock,
    /// Table row
    TableCell,
    /// Wiki-style link occupying the whole line (`[[target]]`)
    WikiLink,
    /// Anything else
    #[default]
    Paragraph,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached Patterns
// ─────────────────────────────────────────────────────────────────────────────

fn ordered_list_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").expect("hard-coded pattern"))
}

fn alert_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\[!(?:note|tip|important|warning|caution)\]").expect("hard-coded pattern")
    })
}

fn wiki_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\[[^\[\]]+\]\]$").expect("hard-coded pattern"))
}

fn heading_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,6}\s+").expect("hard-coded pattern"))
}

fn list_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+").expect("hard-coded pattern"))
}

fn blockquote_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:>[ \t]*)+").expect("hard-coded pattern"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Classify a single line of raw markdown.
///
/// Rules are checked in order against the line with leading whitespace
/// stripped: heading, list item, code fence, alert, blockquote, details,
/// table row, wiki link, paragraph.
pub fn detect_node_type(line: &str) -> NodeType {
    let trimmed = line.trim_start();

    if is_atx_heading(trimmed) {
        return NodeType::Heading;
    }

    if is_list_marker(trimmed) {
        return NodeType::ListItem;
    }

    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        return NodeType::CodeBlock;
    }

    if let Some(rest) = strip_blockquote_markers(trimmed) {
        if alert_re().is_match(rest) {
            return NodeType::AlertBlock;
        }
        return NodeType::Blockquote;
    }

    if trimmed.starts_with("::: details") || trimmed.starts_with("<details") {
        return NodeType::DetailsBlock;
    }

    if is_table_row(trimmed) {
        return NodeType::TableCell;
    }

    if wiki_link_re().is_match(line.trim()) {
        return NodeType::WikiLink;
    }

    NodeType::Paragraph
}

/// Check for an ATX heading: 1-6 `#` followed by whitespace.
fn is_atx_heading(trimmed: &str) -> bool {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return false;
    }
    trimmed
        .chars()
        .nth(hashes)
        .is_some_and(|c| c.is_whitespace())
}

/// Check for a bullet (`-`, `*`, `+`) or ordered (`1.`) list marker.
fn is_list_marker(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-' | '*' | '+') => chars.next().is_some_and(|c| c.is_whitespace()),
        Some(c) if c.is_ascii_digit() => ordered_list_re().is_match(trimmed),
        _ => false,
    }
}

/// Strip one or more blockquote markers (`>` plus optional spacing) from the
/// line start, returning the remainder, or `None` if the line is not quoted.
fn strip_blockquote_markers(trimmed: &str) -> Option<&str> {
    let m = blockquote_marker_re().find(trimmed)?;
    Some(&trimmed[m.end()..])
}

/// Check for a table row: starts and ends with `|`, or starts with `|` and
/// contains a second one.
fn is_table_row(trimmed: &str) -> bool {
    if !trimmed.starts_with('|') {
        return false;
    }
    let trimmed = trimmed.trim_end();
    trimmed.len() > 1 && (trimmed.ends_with('|') || trimmed[1..].contains('|'))
}

// ─────────────────────────────────────────────────────────────────────────────
// Code Fence Spans
// ─────────────────────────────────────────────────────────────────────────────

/// Find the opening line of the code fence enclosing `line_index`, if any.
///
/// Scans lines `0..line_index` maintaining an open-fence state keyed by the
/// fence marker character. A fence only closes when the *same* marker
/// reappears while open; a mismatched marker (a `~~~` line inside a
/// backtick fence) is content, not a close.
pub fn find_code_fence_start_line(lines: &[&str], line_index: usize) -> Option<usize> {
    let mut open: Option<(char, usize)> = None;

    for (i, line) in lines.iter().enumerate().take(line_index) {
        let trimmed = line.trim_start();
        let marker = if trimmed.starts_with("```") {
            Some('`')
        } else if trimmed.starts_with("~~~") {
            Some('~')
        } else {
            None
        };

        if let Some(ch) = marker {
            match open {
                None => open = Some((ch, i)),
                Some((open_ch, _)) if open_ch == ch => open = None,
                // Mismatched fence marker inside an open fence is content
                Some(_) => {}
            }
        }
    }

    open.map(|(_, start)| start)
}

/// Whether `line_index` lies inside an open code fence.
pub fn is_inside_code_block(lines: &[&str], line_index: usize) -> bool {
    find_code_fence_start_line(lines, line_index).is_some()
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Stripping
// ─────────────────────────────────────────────────────────────────────────────

/// Remove leading block markers from a line, adjusting a cursor column.
///
/// Heading markers, list markers, and repeated blockquote markers are removed
/// from the line start in that order, decrementing `column` by each marker's
/// character length. A column that falls inside a marker clamps to 0 (the
/// cursor sat in non-content syntax).
///
/// Returns the stripped text and the adjusted column.
pub fn strip_markdown_syntax(line: &str, column: usize) -> (String, usize) {
    let mut text = line;
    let mut column = column;

    for marker in [heading_marker_re(), list_marker_re(), blockquote_marker_re()] {
        if let Some(m) = marker.find(text) {
            let marker_chars = m.as_str().chars().count();
            column = column.saturating_sub(marker_chars);
            text = &text[m.end()..];
        }
    }

    (text.to_string(), column)
}

/// Ordered inline-formatting replacements. Wider constructs (footnotes,
/// images, links) come before generic emphasis markers so nested syntax is
/// not mis-parsed.
fn inline_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"\[\^[^\]\s]+\]", ""),            // footnote reference, removed
            (r"!\[([^\]]*)\]\([^)]*\)", "$1"),  // image -> alt text
            (r"\[([^\]]*)\]\([^)]*\)", "$1"),   // link -> label
            (r"\$([^$\n]+)\$", "$1"),           // inline math
            (r"\*\*([^*]+)\*\*", "$1"),         // bold
            (r"__([^_]+)__", "$1"),             // bold (underscore)
            (r"~~([^~]+)~~", "$1"),             // strikethrough
            (r"\*([^*]+)\*", "$1"),             // italic
            (r"_([^_]+)_", "$1"),               // italic (underscore)
            (r"`([^`]+)`", "$1"),               // inline code
        ]
        .into_iter()
        .map(|(pattern, rep)| (Regex::new(pattern).expect("hard-coded pattern"), rep))
        .collect()
    })
}

/// Strip inline markdown formatting from text.
///
/// Footnote references are removed entirely; math, bold, italic,
/// strikethrough, and inline code are unwrapped; links and images are
/// replaced with their label text. This transform is not exactly invertible;
/// [`crate::recovery::map_stripped_to_original`] provides the best-effort
/// reverse mapping.
pub fn strip_inline_formatting(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in inline_patterns() {
        if pattern.is_match(&result) {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
