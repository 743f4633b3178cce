//! Cursor Snapshots
//!
//! The canonical cross-representation snapshot: everything one surface knows
//! about the cursor, in terms the other surface can consume. A snapshot is
//! created by one adapter's extract operation, handed across the
//! representation switch (in the embedding application this crosses an IPC
//! boundary as JSON, hence the serde derives), consumed once by the
//! counterpart adapter's restore operation, and discarded.

use serde::{Deserialize, Serialize};

use crate::classify::NodeType;
use crate::context::CursorContext;

// ─────────────────────────────────────────────────────────────────────────────
// BlockAnchor
// ─────────────────────────────────────────────────────────────────────────────

/// Exact structural coordinates inside a compound block.
///
/// Present only when the cursor lies in a table or fenced code block. These
/// coordinates must be preferred over fingerprint matching whenever present:
/// compound blocks routinely contain duplicate or very short cell/line
/// content that defeats text search. Only the rendered-tree side can produce
/// anchors; the flat side has no equivalent addressing, which is why
/// [`CursorInfo::block_anchor`] is an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockAnchor {
    /// Position inside a table: row and cell index, offset within the cell
    Table {
        row: usize,
        col: usize,
        offset_in_cell: usize,
    },
    /// Position inside a code block: line within the block, column in line
    Code {
        line_in_block: usize,
        column_in_line: usize,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// CursorInfo
// ─────────────────────────────────────────────────────────────────────────────

/// The cross-representation cursor snapshot.
///
/// All offsets are character offsets; `source_line` is 0-indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorInfo {
    /// Source line the cursor's block was parsed from
    pub source_line: usize,
    /// Structural type of the cursor's line/block
    pub node_type: NodeType,
    /// The word containing or adjacent to the cursor
    pub word_at_cursor: String,
    /// Cursor offset from the start of `word_at_cursor`
    pub offset_in_word: usize,
    /// Cursor position as a fraction of the line's content length, in `[0, 1]`
    pub percent_in_line: f32,
    /// Raw characters immediately before the cursor (bounded window)
    pub context_before: String,
    /// Raw characters immediately after the cursor (bounded window)
    pub context_after: String,
    /// Structural coordinates when the cursor sat in a compound block
    pub block_anchor: Option<BlockAnchor>,
}

impl Default for CursorInfo {
    /// The neutral snapshot: start of the document, no signal.
    fn default() -> Self {
        Self {
            source_line: 0,
            node_type: NodeType::Paragraph,
            word_at_cursor: String::new(),
            offset_in_word: 0,
            percent_in_line: 0.0,
            context_before: String::new(),
            context_after: String::new(),
            block_anchor: None,
        }
    }
}

impl CursorInfo {
    /// The fingerprint portion of this snapshot, for the recovery engine.
    pub fn cursor_context(&self) -> CursorContext {
        CursorContext {
            word: self.word_at_cursor.clone(),
            offset_in_word: self.offset_in_word,
            context_before: self.context_before.clone(),
            context_after: self.context_after.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let info = CursorInfo::default();
        assert_eq!(info.source_line, 0);
        assert_eq!(info.node_type, NodeType::Paragraph);
        assert!(info.block_anchor.is_none());
        assert!(!info.cursor_context().has_signal());
    }

    #[test]
    fn test_serde_roundtrip() {
        let info = CursorInfo {
            source_line: 7,
            node_type: NodeType::TableCell,
            word_at_cursor: "cell".to_string(),
            offset_in_word: 2,
            percent_in_line: 0.5,
            context_before: "| a | ".to_string(),
            context_after: "cell |".to_string(),
            block_anchor: Some(BlockAnchor::Table {
                row: 1,
                col: 2,
                offset_in_cell: 2,
            }),
        };

        let json = serde_json::to_string(&info).unwrap();
        let back: CursorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_node_type_snake_case_encoding() {
        let json = serde_json::to_string(&NodeType::AlertBlock).unwrap();
        assert_eq!(json, r#""alert_block""#);
    }

    #[test]
    fn test_anchor_tagged_encoding() {
        let anchor = BlockAnchor::Code {
            line_in_block: 3,
            column_in_line: 1,
        };
        let json = serde_json::to_string(&anchor).unwrap();
        assert!(json.contains(r#""kind":"code""#));
    }
}
