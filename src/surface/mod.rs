//! Representation Surface Adapters
//!
//! A document is edited through two surfaces: the *raw* surface (the flat
//! markdown text, cursor = character offset) and the *structured* surface
//! (the rendered block tree, cursor = a position inside one block). On a
//! representation switch the source surface's adapter extracts a
//! [`CursorInfo`](crate::snapshot::CursorInfo) snapshot; once the target
//! surface is ready, its adapter consumes the snapshot to place its own
//! cursor.
//!
//! Both directions share the classifier, the context extractor, and the
//! position recovery engine. Block anchors exist only on the structured
//! side — the raw surface has no structural addressing for tables and code
//! blocks and degrades to line/word matching for them.

mod raw;
mod structured;

pub use raw::{
    extract_from_raw, extract_from_raw_with_config, restore_to_raw, restore_to_raw_with_config,
};
pub use structured::{
    extract_from_structured, extract_from_structured_with_config, restore_to_structured,
    restore_to_structured_with_config,
};
