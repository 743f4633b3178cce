//! Flat-Surface Adapter
//!
//! Extracts a cursor snapshot from a flat markdown buffer at a character
//! offset, and restores an offset from a snapshot. The raw side addresses
//! positions by line and column; leading markdown syntax is stripped before
//! computing the in-line percentage so the metric survives syntax-width
//! differences between the representations.

use log::debug;

use crate::classify::{detect_node_type, is_inside_code_block, strip_markdown_syntax, NodeType};
use crate::config::SyncConfig;
use crate::context::extract_cursor_context_windowed;
use crate::recovery::find_best_position;
use crate::snapshot::CursorInfo;
use crate::string_utils::{char_index_to_line_col, char_len, line_col_to_char_index, split_lines};

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract a cursor snapshot from a flat buffer at a character offset.
pub fn extract_from_raw(buffer: &str, offset: usize) -> CursorInfo {
    extract_from_raw_with_config(buffer, offset, &SyncConfig::default())
}

/// [`extract_from_raw`] with explicit configuration.
pub fn extract_from_raw_with_config(buffer: &str, offset: usize, config: &SyncConfig) -> CursorInfo {
    let offset = offset.min(char_len(buffer));
    let (line, column) = char_index_to_line_col(buffer, offset);
    let lines = split_lines(buffer);
    let line_text = lines.get(line).copied().unwrap_or("");

    // A content line inside an open fence is code regardless of what the
    // line itself looks like
    let node_type = if is_inside_code_block(&lines, line) {
        NodeType::CodeBlock
    } else {
        detect_node_type(line_text)
    };

    let (stripped, adjusted_column) = strip_markdown_syntax(line_text, column);
    let stripped_len = char_len(&stripped);
    let percent_in_line = if stripped_len == 0 {
        0.0
    } else {
        (adjusted_column as f32 / stripped_len as f32).min(1.0)
    };

    let context = extract_cursor_context_windowed(line_text, column, config.context_window);

    CursorInfo {
        source_line: line,
        node_type,
        word_at_cursor: context.word,
        offset_in_word: context.offset_in_word,
        percent_in_line,
        context_before: context.context_before,
        context_after: context.context_after,
        // Structural anchors exist only on the structured surface
        block_anchor: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Restoration
// ─────────────────────────────────────────────────────────────────────────────

/// Restore a snapshot against a flat buffer, returning a character offset.
pub fn restore_to_raw(buffer: &str, info: &CursorInfo) -> usize {
    restore_to_raw_with_config(buffer, info, &SyncConfig::default())
}

/// [`restore_to_raw`] with explicit configuration.
pub fn restore_to_raw_with_config(buffer: &str, info: &CursorInfo, config: &SyncConfig) -> usize {
    if let Some(anchor) = &info.block_anchor {
        // No structural addressing on this side; the anchor's source line
        // still steers the generic search
        debug!("{:?} has no flat-surface equivalent; using text matching", anchor);
    }

    let lines = split_lines(buffer);
    let target_line = info.source_line.min(lines.len().saturating_sub(1));

    let position = find_best_position(
        &lines,
        target_line,
        &info.cursor_context(),
        info.percent_in_line,
        config,
    );

    line_col_to_char_index(buffer, position.line, position.column)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::BlockAnchor;

    // ─────────────────────────────────────────────────────────────────────────
    // Extraction Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extract_plain_paragraph() {
        let buffer = "# Title\n\nThe quick brown fox";
        // Offset of 'b' in "brown": line 2, column 10
        let info = extract_from_raw(buffer, 19);
        assert_eq!(info.source_line, 2);
        assert_eq!(info.node_type, NodeType::Paragraph);
        assert_eq!(info.word_at_cursor, "brown");
        assert_eq!(info.offset_in_word, 0);
        assert_eq!(info.context_before, "The quick ");
        assert!(info.block_anchor.is_none());
    }

    #[test]
    fn test_extract_heading_percent_ignores_marker() {
        // Cursor at the end of "## Title": percent should be 1.0 relative to
        // the stripped text, not diluted by the marker width
        let buffer = "## Title";
        let info = extract_from_raw(buffer, 8);
        assert_eq!(info.node_type, NodeType::Heading);
        assert!((info.percent_in_line - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extract_cursor_inside_marker() {
        let buffer = "## Title";
        let info = extract_from_raw(buffer, 1);
        assert!((info.percent_in_line - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extract_inside_code_fence() {
        let buffer = "```\nlet x = 1;\n```";
        // Offset inside the code line
        let info = extract_from_raw(buffer, 8);
        assert_eq!(info.source_line, 1);
        assert_eq!(info.node_type, NodeType::CodeBlock);
    }

    #[test]
    fn test_extract_offset_past_end_clamps() {
        let info = extract_from_raw("short", 999);
        assert_eq!(info.source_line, 0);
        assert_eq!(info.word_at_cursor, "short");
    }

    #[test]
    fn test_extract_empty_buffer() {
        let info = extract_from_raw("", 0);
        assert_eq!(info.source_line, 0);
        assert!(info.word_at_cursor.is_empty());
        assert!((info.percent_in_line - 0.0).abs() < f32::EPSILON);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Restoration Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_restore_roundtrip_same_buffer() {
        let buffer = "# Title\n\nThe quick brown fox\n\nlast line";
        for offset in [0, 12, 19, 23, 35] {
            let info = extract_from_raw(buffer, offset);
            let restored = restore_to_raw(buffer, &info);
            assert_eq!(restored, offset, "roundtrip failed at offset {}", offset);
        }
    }

    #[test]
    fn test_restore_after_line_inserted_above() {
        let buffer = "# Title\n\nThe quick brown fox";
        let info = extract_from_raw(buffer, 19); // 'b' of "brown"

        // A line pair is inserted above; the content is now one line lower
        let edited = "# Title\n\nnew paragraph\n\nThe quick brown fox";
        let restored = restore_to_raw(edited, &info);
        let (line, column) = char_index_to_line_col(edited, restored);
        assert_eq!(line, 4);
        assert_eq!(column, 10);
    }

    #[test]
    fn test_restore_anchor_degrades_to_text_matching() {
        let buffer = "| a | b |\n|---|---|\n| c | d |";
        let info = CursorInfo {
            source_line: 2,
            node_type: NodeType::TableCell,
            word_at_cursor: "d".to_string(),
            offset_in_word: 0,
            percent_in_line: 0.8,
            context_before: "c ".to_string(),
            context_after: String::new(),
            block_anchor: Some(BlockAnchor::Table {
                row: 1,
                col: 1,
                offset_in_cell: 0,
            }),
        };
        let restored = restore_to_raw(buffer, &info);
        let (line, _) = char_index_to_line_col(buffer, restored);
        assert_eq!(line, 2);
    }

    #[test]
    fn test_restore_into_empty_buffer() {
        let info = extract_from_raw("some text here", 5);
        assert_eq!(restore_to_raw("", &info), 0);
    }

    #[test]
    fn test_restore_percent_fallback_on_new_content() {
        let info = CursorInfo {
            source_line: 0,
            percent_in_line: 0.5,
            ..CursorInfo::default()
        };
        let restored = restore_to_raw("0123456789", &info);
        assert_eq!(restored, 5);
    }
}
