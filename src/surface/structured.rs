//! Structured-Surface Adapter
//!
//! Extracts a cursor snapshot from a position in the rendered block tree, and
//! restores a snapshot into a tree. The tree side addresses positions by
//! source-line tag plus an offset into a block's plain text; there is no
//! markdown syntax to strip here, but tags go stale as the raw text is
//! edited, so restoration falls through a cascade: structural anchor, exact
//! tag, closest tag at or before the target, document start. No failure in
//! this module is visible to the caller.

use log::debug;

use crate::anchor::{apply_code_anchor, apply_table_anchor, extract_block_anchor};
use crate::classify::NodeType;
use crate::config::SyncConfig;
use crate::context::extract_cursor_context_windowed;
use crate::error::{Error, Result, ResultExt};
use crate::recovery::find_best_position;
use crate::snapshot::{BlockAnchor, CursorInfo};
use crate::string_utils::char_len;
use crate::tree::{BlockKind, BlockNode, TreeCursor};

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract a cursor snapshot from a block tree at a tree cursor.
///
/// Degenerate cursors (stale path, empty tree) yield the neutral snapshot
/// rather than failing.
pub fn extract_from_structured(tree: &BlockNode, cursor: &TreeCursor) -> CursorInfo {
    extract_from_structured_with_config(tree, cursor, &SyncConfig::default())
}

/// [`extract_from_structured`] with explicit configuration.
pub fn extract_from_structured_with_config(
    tree: &BlockNode,
    cursor: &TreeCursor,
    config: &SyncConfig,
) -> CursorInfo {
    try_extract(tree, cursor, config)
        .unwrap_or_warn_default(CursorInfo::default(), "structured cursor extraction")
}

fn try_extract(tree: &BlockNode, cursor: &TreeCursor, config: &SyncConfig) -> Result<CursorInfo> {
    if tree.node_at_path(&cursor.path).is_none() {
        return Err(Error::InvalidCursor(format!(
            "path {:?} does not resolve",
            cursor.path
        )));
    }

    let source_line = resolve_source_line(tree, &cursor.path)
        .unwrap_or_else(|| estimate_source_line(tree, &cursor.path));
    let node_type = classify_ancestors(tree, &cursor.path);
    let block_anchor = extract_block_anchor(tree, cursor);

    // Context, word, and percentage come from the enclosing text block's
    // plain content — the rendered surface has no syntax to strip
    let block_depth = enclosing_text_block_depth(tree, &cursor.path);
    let block = tree
        .node_at_path(&cursor.path[..block_depth])
        .ok_or_else(|| Error::InvalidCursor("block prefix does not resolve".to_string()))?;

    let text = block.text_content();
    let len = char_len(&text);
    let offset_in_block = block
        .text_offset_within(&cursor.path[block_depth..], cursor.offset)
        .unwrap_or(0)
        .min(len);

    let context = extract_cursor_context_windowed(&text, offset_in_block, config.context_window);
    let percent_in_line = if len == 0 {
        0.0
    } else {
        offset_in_block as f32 / len as f32
    };

    Ok(CursorInfo {
        source_line,
        node_type,
        word_at_cursor: context.word,
        offset_in_word: context.offset_in_word,
        percent_in_line,
        context_before: context.context_before,
        context_after: context.context_after,
        block_anchor,
    })
}

/// Source-line tag from the nearest tagged ancestor, innermost first.
fn resolve_source_line(tree: &BlockNode, path: &[usize]) -> Option<usize> {
    for depth in (0..=path.len()).rev() {
        if let Some(line) = tree.node_at_path(&path[..depth]).and_then(|n| n.source_line) {
            return Some(line);
        }
    }
    None
}

/// Estimate a missing tag from document position: the last tagged node seen
/// in document order before the cursor's node. Content inserted on the
/// rendered side without re-tagging has no better answer.
fn estimate_source_line(tree: &BlockNode, path: &[usize]) -> usize {
    let mut last_tag = 0;
    for (node_path, node) in tree.preorder() {
        if node_path == path {
            break;
        }
        if let Some(line) = node.source_line {
            last_tag = line;
        }
    }
    last_tag
}

/// Classify the cursor by its ancestor chain, by block-type priority.
fn classify_ancestors(tree: &BlockNode, path: &[usize]) -> NodeType {
    let mut kinds = Vec::with_capacity(path.len() + 1);
    for depth in (0..=path.len()).rev() {
        if let Some(node) = tree.node_at_path(&path[..depth]) {
            kinds.push(&node.kind);
        }
    }

    if kinds.iter().any(|k| matches!(k, BlockKind::Heading { .. })) {
        NodeType::Heading
    } else if kinds.iter().any(|k| matches!(k, BlockKind::CodeBlock { .. })) {
        NodeType::CodeBlock
    } else if kinds.iter().any(|k| matches!(k, BlockKind::BlockQuote)) {
        NodeType::Blockquote
    } else if kinds.iter().any(|k| matches!(k, BlockKind::TableCell)) {
        NodeType::TableCell
    } else if kinds
        .iter()
        .any(|k| matches!(k, BlockKind::ListItem | BlockKind::TaskItem { .. }))
    {
        NodeType::ListItem
    } else {
        NodeType::Paragraph
    }
}

/// Depth of the innermost ancestor a cursor's text belongs to; the cursor's
/// own node when nothing on the path is a text block.
fn enclosing_text_block_depth(tree: &BlockNode, path: &[usize]) -> usize {
    for depth in (0..=path.len()).rev() {
        if tree
            .node_at_path(&path[..depth])
            .is_some_and(|n| n.is_text_block())
        {
            return depth;
        }
    }
    path.len()
}

// ─────────────────────────────────────────────────────────────────────────────
// Restoration
// ─────────────────────────────────────────────────────────────────────────────

/// Restore a snapshot into a block tree, returning the cursor to apply.
///
/// The embedding view applies the returned cursor to its live selection; that
/// move is navigation, not an edit, and must not enter undo history.
pub fn restore_to_structured(tree: &BlockNode, info: &CursorInfo) -> TreeCursor {
    restore_to_structured_with_config(tree, info, &SyncConfig::default())
}

/// [`restore_to_structured`] with explicit configuration.
pub fn restore_to_structured_with_config(
    tree: &BlockNode,
    info: &CursorInfo,
    config: &SyncConfig,
) -> TreeCursor {
    // Structural coordinates are exact where fingerprints are not; always
    // try them first
    if let Some(anchor) = info.block_anchor {
        let restored = match anchor {
            BlockAnchor::Table {
                row,
                col,
                offset_in_cell,
            } => apply_table_anchor(tree, info.source_line, row, col, offset_in_cell),
            BlockAnchor::Code {
                line_in_block,
                column_in_line,
            } => apply_code_anchor(tree, info.source_line, line_in_block, column_in_line),
        };
        match restored {
            Some(cursor) => return cursor,
            None => debug!("{:?} did not resolve; falling back to text matching", anchor),
        }
    }

    try_restore(tree, info, config)
        .unwrap_or_warn_default(document_start(tree), "structured cursor restore")
}

fn try_restore(tree: &BlockNode, info: &CursorInfo, config: &SyncConfig) -> Result<TreeCursor> {
    let path = tree
        .find_by_source_line(info.source_line, |n| n.is_text_block())
        .ok_or(Error::StaleTarget {
            source_line: info.source_line,
        })?;
    let block = tree
        .node_at_path(&path)
        .ok_or_else(|| Error::InvalidCursor("found path does not resolve".to_string()))?;

    let text = block.text_content();
    let len = char_len(&text);

    // A cursor this close to the end means trailing characters were consumed
    // by syntax stripping; snap to the block end
    if info.percent_in_line >= config.end_snap_threshold {
        return Ok(TreeCursor::new(path, len));
    }

    // The block's content is one unit: same word/context strategy as the
    // flat side, but no cross-line search
    let position = find_best_position(
        &[text.as_str()],
        0,
        &info.cursor_context(),
        info.percent_in_line,
        config,
    );

    Ok(TreeCursor::new(path, position.column.min(len)))
}

/// The first text block in document order, or the tree root.
fn document_start(tree: &BlockNode) -> TreeCursor {
    tree.preorder()
        .into_iter()
        .find(|(_, node)| node.is_text_block())
        .map(|(path, _)| TreeCursor::new(path, 0))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
