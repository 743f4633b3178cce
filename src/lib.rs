//! lodestone - Cursor Synchronization Between Markdown Representations
//!
//! A markdown document can be edited through two structurally different
//! surfaces: the raw text (a flat character buffer) and a rendered block tree
//! (headings, lists, tables, code blocks). Switching between them is a lossy
//! transformation — syntax is stripped and re-inserted, multi-line constructs
//! collapse into single blocks, duplicate content defeats plain text search —
//! and the user's cursor must survive the trip.
//!
//! This crate reconstructs cursor intent across that switch. The source
//! surface extracts a [`CursorInfo`] snapshot (line tag, node type, word
//! under the cursor, surrounding characters, in-line percentage, structural
//! anchor for compound blocks); the target surface consumes it through a
//! priority cascade that prefers exact structural coordinates, then context
//! and word fingerprints, then proportional placement. Every failure mode
//! degrades to the best available position — nothing here raises to a user.
//!
//! # Example
//! ```ignore
//! use lodestone::{extract_from_raw, restore_to_structured, parse_markdown};
//!
//! let buffer = "# Title\n\nThe quick brown fox";
//! let info = extract_from_raw(buffer, 19);
//!
//! let tree = parse_markdown(buffer)?;
//! let cursor = restore_to_structured(&tree, &info);
//! // The rendered view applies `cursor` to its selection (outside undo history)
//! ```

pub mod anchor;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod recovery;
pub mod schedule;
pub mod snapshot;
pub mod string_utils;
pub mod surface;
pub mod tree;

// Only export what collaborators actually consume
pub use classify::NodeType;
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use schedule::{RestorePhase, RestoreScheduler};
pub use snapshot::{BlockAnchor, CursorInfo};
pub use surface::{
    extract_from_raw, extract_from_structured, restore_to_raw, restore_to_structured,
};
pub use tree::{parse_markdown, parse_markdown_with_options, BlockKind, BlockNode, ParseOptions, TreeCursor};
