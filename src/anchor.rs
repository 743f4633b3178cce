//! Block Anchors
//!
//! Compound blocks — tables and fenced code blocks — cannot be addressed
//! reliably by text fingerprints: cells are short, duplicated, and code lines
//! repeat (every closing brace looks the same). This module computes and
//! consumes exact structural coordinates for those blocks instead: table
//! row/column plus offset in the cell, or line/column within a code block's
//! literal. Anchor restoration is always attempted before fingerprint
//! matching.

use crate::snapshot::BlockAnchor;
use crate::string_utils::{char_index_to_line_col, char_len};
use crate::tree::{BlockKind, BlockNode, TreeCursor};

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Compute the structural anchor for a cursor, if it sits in a compound block.
///
/// Walks the cursor's ancestors from the innermost out. A table cell ancestor
/// wins over anything further out; otherwise a code block ancestor produces a
/// code anchor. Cursors outside compound blocks have no anchor.
pub fn extract_block_anchor(tree: &BlockNode, cursor: &TreeCursor) -> Option<BlockAnchor> {
    for depth in (0..=cursor.path.len()).rev() {
        let prefix = &cursor.path[..depth];
        let node = tree.node_at_path(prefix)?;

        match &node.kind {
            BlockKind::TableCell => {
                if depth < 2 {
                    return None;
                }
                // The cell's index within its row, and the row's within its table
                let col = prefix[depth - 1];
                let row = prefix[depth - 2];
                let offset_in_cell = node.text_offset_within(&cursor.path[depth..], cursor.offset)?;
                return Some(BlockAnchor::Table {
                    row,
                    col,
                    offset_in_cell,
                });
            }
            BlockKind::CodeBlock { .. } => {
                let offset = node.text_offset_within(&cursor.path[depth..], cursor.offset)?;
                let text = node.text_content();
                let (line_in_block, column_in_line) = char_index_to_line_col(&text, offset);
                return Some(BlockAnchor::Code {
                    line_in_block,
                    column_in_line,
                });
            }
            _ => {}
        }
    }

    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Restoration
// ─────────────────────────────────────────────────────────────────────────────

/// Restore a table anchor against a tree.
///
/// Locates the table tagged with `source_line` (or the closest tag at or
/// before it), descends to the addressed row and cell, and clamps the offset
/// to the cell's content.
pub fn apply_table_anchor(
    tree: &BlockNode,
    source_line: usize,
    row: usize,
    col: usize,
    offset_in_cell: usize,
) -> Option<TreeCursor> {
    let table_path =
        tree.find_by_source_line(source_line, |n| matches!(n.kind, BlockKind::Table { .. }))?;
    let table = tree.node_at_path(&table_path)?;

    let row_node = table.children.get(row)?;
    if !matches!(row_node.kind, BlockKind::TableRow { .. }) {
        return None;
    }
    let cell = row_node.children.get(col)?;

    let offset = offset_in_cell.min(cell.text_len());
    let mut path = table_path;
    path.push(row);
    path.push(col);
    Some(TreeCursor::new(path, offset))
}

/// Restore a code anchor against a tree.
///
/// Locates the code block tagged with `source_line` (or the closest tag at or
/// before it) and re-derives the offset from the block's literal: full lines
/// up to `line_in_block` (each plus its newline), then the column clamped to
/// that line, the whole clamped to the literal's length.
pub fn apply_code_anchor(
    tree: &BlockNode,
    source_line: usize,
    line_in_block: usize,
    column_in_line: usize,
) -> Option<TreeCursor> {
    let path = tree.find_by_source_line(source_line, |n| {
        matches!(n.kind, BlockKind::CodeBlock { .. })
    })?;
    let node = tree.node_at_path(&path)?;
    let text = node.text_content();

    let lines: Vec<&str> = text.split('\n').collect();
    let line = line_in_block.min(lines.len() - 1);
    let mut offset = 0;
    for l in &lines[..line] {
        offset += char_len(l) + 1;
    }
    offset += column_in_line.min(char_len(lines[line]));

    Some(TreeCursor::new(path, offset.min(char_len(&text))))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::parse_markdown;

    const TABLE_MD: &str = "| H1 | H2 | H3 |\n|----|----|----|\n| x | x | y |";

    // ─────────────────────────────────────────────────────────────────────────
    // Table Anchor Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extract_table_anchor() {
        let tree = parse_markdown(TABLE_MD).unwrap();
        // Body row (row 1), second cell, cursor in its text child
        let cursor = TreeCursor::new(vec![0, 1, 1, 0], 1);
        let anchor = extract_block_anchor(&tree, &cursor).expect("table anchor");
        assert_eq!(
            anchor,
            BlockAnchor::Table {
                row: 1,
                col: 1,
                offset_in_cell: 1
            }
        );
    }

    #[test]
    fn test_duplicate_cells_restore_to_their_own_cell() {
        // Both cells contain "x"; only structural coordinates can tell them
        // apart
        let tree = parse_markdown(TABLE_MD).unwrap();

        let first = apply_table_anchor(&tree, 2, 1, 0, 0).expect("first cell");
        let second = apply_table_anchor(&tree, 2, 1, 1, 0).expect("second cell");

        assert_ne!(first.path, second.path);
        assert_eq!(first.path, vec![0, 1, 0]);
        assert_eq!(second.path, vec![0, 1, 1]);
    }

    #[test]
    fn test_table_anchor_offset_clamps_to_cell() {
        let tree = parse_markdown(TABLE_MD).unwrap();
        let cursor = apply_table_anchor(&tree, 2, 1, 2, 99).expect("cell");
        // Cell "y" has one character
        assert_eq!(cursor.offset, 1);
    }

    #[test]
    fn test_table_anchor_out_of_range_row() {
        let tree = parse_markdown(TABLE_MD).unwrap();
        assert!(apply_table_anchor(&tree, 2, 9, 0, 0).is_none());
    }

    #[test]
    fn test_no_anchor_outside_compound_blocks() {
        let tree = parse_markdown("plain paragraph").unwrap();
        let cursor = TreeCursor::new(vec![0, 0], 3);
        assert!(extract_block_anchor(&tree, &cursor).is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Code Anchor Tests
    // ─────────────────────────────────────────────────────────────────────────

    const CODE_MD: &str = "```rust\nfn a() {}\nfn b() {}\n```";

    #[test]
    fn test_extract_code_anchor() {
        let tree = parse_markdown(CODE_MD).unwrap();
        // Offset 13 is column 3 of the second code line
        let cursor = TreeCursor::new(vec![0], 13);
        let anchor = extract_block_anchor(&tree, &cursor).expect("code anchor");
        assert_eq!(
            anchor,
            BlockAnchor::Code {
                line_in_block: 1,
                column_in_line: 3
            }
        );
    }

    #[test]
    fn test_apply_code_anchor_roundtrip() {
        let tree = parse_markdown(CODE_MD).unwrap();
        let cursor = apply_code_anchor(&tree, 0, 1, 3).expect("code cursor");
        assert_eq!(cursor.path, vec![0]);
        assert_eq!(cursor.offset, 13);
    }

    #[test]
    fn test_apply_code_anchor_clamps_column() {
        let tree = parse_markdown(CODE_MD).unwrap();
        // Column past the end of the line clamps to the line's length
        let cursor = apply_code_anchor(&tree, 0, 0, 99).expect("code cursor");
        assert_eq!(cursor.offset, 9);
    }

    #[test]
    fn test_apply_code_anchor_clamps_line() {
        let tree = parse_markdown(CODE_MD).unwrap();
        let cursor = apply_code_anchor(&tree, 0, 99, 0).expect("code cursor");
        // Clamped to the final (empty, after trailing newline) literal line
        assert_eq!(cursor.offset, 20);
    }

    #[test]
    fn test_anchor_miss_on_wrong_block_type() {
        let tree = parse_markdown("just a paragraph").unwrap();
        assert!(apply_table_anchor(&tree, 0, 0, 0, 0).is_none());
        assert!(apply_code_anchor(&tree, 0, 0, 0).is_none());
    }
}
