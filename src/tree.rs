//! Structured Block Tree
//!
//! The rendered representation consumed by the structured-surface adapter: a
//! tree of typed blocks where each node carries the source line it was parsed
//! from. Collaborators may construct these trees however they like; the
//! [`parse_markdown`] reference builder produces one from markdown text using
//! comrak, a CommonMark + GFM compatible parser, tagging every node with its
//! source position.
//!
//! Lines are 0-indexed throughout the crate; comrak's 1-indexed source
//! positions are converted once, here at the builder boundary.

use comrak::{
    nodes::{AstNode, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::string_utils::char_len;

// ─────────────────────────────────────────────────────────────────────────────
// Parse Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for the reference markdown parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Enable front matter (YAML/TOML)
    pub front_matter_delimiter: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            footnotes: true,
            front_matter_delimiter: Some("---".to_string()),
        }
    }
}

impl ParseOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.table = self.tables;
        options.extension.strikethrough = self.strikethrough;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;
        options.extension.front_matter_delimiter = self.front_matter_delimiter.clone();

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The type of a node in the block tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Root document node
    Document,
    /// Heading (level 1-6)
    Heading { level: u8 },
    /// Paragraph
    Paragraph,
    /// Block quote (>)
    BlockQuote,
    /// List container
    List { ordered: bool },
    /// List item
    ListItem,
    /// Task list item
    TaskItem { checked: bool },
    /// Fenced or indented code block
    CodeBlock { language: String, literal: String },
    /// HTML block
    HtmlBlock(String),
    /// Thematic break (horizontal rule)
    ThematicBreak,
    /// Table
    Table { num_columns: usize },
    /// Table row
    TableRow { header: bool },
    /// Table cell
    TableCell,
    /// Inline text content
    Text(String),
    /// Inline code
    Code(String),
    /// Soft line break
    SoftBreak,
    /// Hard line break
    LineBreak,
    /// Emphasis (italic)
    Emphasis,
    /// Strong emphasis (bold)
    Strong,
    /// Strikethrough
    Strikethrough,
    /// Link
    Link { url: String },
    /// Image
    Image { url: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// TreeCursor
// ─────────────────────────────────────────────────────────────────────────────

/// A cursor address in a block tree.
///
/// `path` is the child-index path from the root to the node the cursor sits
/// in; `offset` is a character offset into that node's text content. The
/// default value addresses the start of the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeCursor {
    /// Child indices from the root to the cursor's node
    pub path: Vec<usize>,
    /// Character offset within the node's text content
    pub offset: usize,
}

impl TreeCursor {
    /// Create a cursor at `offset` within the node addressed by `path`.
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BlockNode
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the block tree with its originating source line.
///
/// `source_line` is `None` for content inserted on the rendered side without
/// re-tagging; lookups fall back to the nearest tagged node in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    /// The type of this node
    pub kind: BlockKind,
    /// 0-indexed source line this node was parsed from, if known
    pub source_line: Option<usize>,
    /// Child nodes
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// Create an untagged node with no children.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            source_line: None,
            children: Vec::new(),
        }
    }

    /// Set the source line tag.
    pub fn with_source_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    /// Set the children.
    pub fn with_children(mut self, children: Vec<BlockNode>) -> Self {
        self.children = children;
        self
    }

    /// Get all text content from this node and its descendants.
    ///
    /// A code block contributes its literal; soft breaks render as spaces and
    /// hard breaks as newlines, matching what an editing view displays.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.kind {
            BlockKind::Text(t) => output.push_str(t),
            BlockKind::Code(t) => output.push_str(t),
            BlockKind::CodeBlock { literal, .. } => output.push_str(literal),
            BlockKind::SoftBreak => output.push(' '),
            BlockKind::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }

    /// Character length of this node's text content.
    pub fn text_len(&self) -> usize {
        char_len(&self.text_content())
    }

    /// Whether a cursor can sit directly in this block's text.
    ///
    /// Containers (lists, quotes, tables) are not text blocks; their
    /// paragraphs, headings, cells, and code blocks are.
    pub fn is_text_block(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Heading { .. }
                | BlockKind::Paragraph
                | BlockKind::CodeBlock { .. }
                | BlockKind::TableCell
        )
    }

    /// Text this node contributes before its children in `text_content`.
    fn own_text_len(&self) -> usize {
        match &self.kind {
            BlockKind::Text(t) => char_len(t),
            BlockKind::Code(t) => char_len(t),
            BlockKind::CodeBlock { literal, .. } => char_len(literal),
            BlockKind::SoftBreak | BlockKind::LineBreak => 1,
            _ => 0,
        }
    }

    /// Offset of a descendant cursor position within this node's text.
    ///
    /// `rel_path` addresses a descendant relative to this node; `offset` is a
    /// character offset into that descendant's text content. Returns `None`
    /// if the path does not resolve.
    pub fn text_offset_within(&self, rel_path: &[usize], offset: usize) -> Option<usize> {
        match rel_path.split_first() {
            None => Some(offset.min(self.text_len())),
            Some((&index, rest)) => {
                let target = self.children.get(index)?;
                let mut acc = self.own_text_len();
                for child in &self.children[..index] {
                    acc += child.text_len();
                }
                Some(acc + target.text_offset_within(rest, offset)?)
            }
        }
    }

    /// Resolve a child-index path to the node it addresses.
    pub fn node_at_path(&self, path: &[usize]) -> Option<&BlockNode> {
        let mut node = self;
        for &index in path {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// All nodes in document order, each with its path from this node.
    pub fn preorder(&self) -> Vec<(Vec<usize>, &BlockNode)> {
        let mut out = Vec::new();
        self.collect_preorder(&mut Vec::new(), &mut out);
        out
    }

    fn collect_preorder<'a>(
        &'a self,
        path: &mut Vec<usize>,
        out: &mut Vec<(Vec<usize>, &'a BlockNode)>,
    ) {
        out.push((path.clone(), self));
        for (i, child) in self.children.iter().enumerate() {
            path.push(i);
            child.collect_preorder(path, out);
            path.pop();
        }
    }

    /// Find the first matching block tagged with `target` exactly, falling
    /// back to the matching block with the closest tag at or before it.
    pub fn find_by_source_line<F>(&self, target: usize, pred: F) -> Option<Vec<usize>>
    where
        F: Fn(&BlockNode) -> bool,
    {
        let mut best: Option<(usize, Vec<usize>)> = None;
        for (path, node) in self.preorder() {
            if !pred(node) {
                continue;
            }
            let Some(line) = node.source_line else {
                continue;
            };
            if line == target {
                return Some(path);
            }
            if line < target && best.as_ref().map_or(true, |(b, _)| line > *b) {
                best = Some((line, path));
            }
        }
        best.map(|(_, path)| path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown text into a tagged block tree.
///
/// # Example
/// ```ignore
/// let tree = parse_markdown("# Hello\n\nWorld")?;
/// assert_eq!(tree.children.len(), 2);
/// ```
pub fn parse_markdown(markdown: &str) -> Result<BlockNode> {
    parse_markdown_with_options(markdown, &ParseOptions::default())
}

/// Parse markdown text with custom options.
pub fn parse_markdown_with_options(markdown: &str, options: &ParseOptions) -> Result<BlockNode> {
    let arena = Arena::new();
    let comrak_options = options.to_comrak_options();

    let root = parse_document(&arena, markdown, &comrak_options);

    convert_node(root)
}

/// Convert a comrak AST node to a BlockNode.
fn convert_node<'a>(node: &'a AstNode<'a>) -> Result<BlockNode> {
    let ast = node.data.borrow();
    let sourcepos = ast.sourcepos;

    let kind = convert_node_value(&ast.value);

    // comrak lines are 1-indexed; the crate is 0-indexed
    let mut block = BlockNode {
        kind,
        source_line: Some(sourcepos.start.line.saturating_sub(1)),
        children: Vec::new(),
    };

    for child in node.children() {
        block.children.push(convert_node(child)?);
    }

    Ok(block)
}

/// Convert a comrak NodeValue to a BlockKind.
fn convert_node_value(value: &NodeValue) -> BlockKind {
    match value {
        NodeValue::Document => BlockKind::Document,
        NodeValue::BlockQuote => BlockKind::BlockQuote,
        NodeValue::List(list) => BlockKind::List {
            ordered: matches!(list.list_type, ComrakListType::Ordered),
        },
        NodeValue::Item(_) => BlockKind::ListItem,
        NodeValue::TaskItem(checked) => BlockKind::TaskItem {
            checked: checked.map(|c| c == 'x' || c == 'X').unwrap_or(false),
        },
        NodeValue::CodeBlock(code) => BlockKind::CodeBlock {
            language: code.info.clone(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(html) => BlockKind::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => BlockKind::Paragraph,
        NodeValue::Heading(heading) => BlockKind::Heading {
            level: heading.level,
        },
        NodeValue::ThematicBreak => BlockKind::ThematicBreak,
        NodeValue::Table(table) => BlockKind::Table {
            num_columns: table.num_columns,
        },
        NodeValue::TableRow(header) => BlockKind::TableRow { header: *header },
        NodeValue::TableCell => BlockKind::TableCell,
        NodeValue::Text(text) => BlockKind::Text(text.clone()),
        NodeValue::SoftBreak => BlockKind::SoftBreak,
        NodeValue::LineBreak => BlockKind::LineBreak,
        NodeValue::Code(code) => BlockKind::Code(code.literal.clone()),
        NodeValue::Emph => BlockKind::Emphasis,
        NodeValue::Strong => BlockKind::Strong,
        NodeValue::Strikethrough => BlockKind::Strikethrough,
        NodeValue::Link(link) => BlockKind::Link {
            url: link.url.clone(),
        },
        NodeValue::Image(image) => BlockKind::Image {
            url: image.url.clone(),
        },
        // Anything else contributes no text to the cursor model
        _ => BlockKind::Text(String::new()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────────────────
    // Parsing Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_empty_document() {
        let tree = parse_markdown("").unwrap();
        assert_eq!(tree.kind, BlockKind::Document);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_parse_heading_and_paragraph() {
        let tree = parse_markdown("# Heading\n\nParagraph text").unwrap();
        assert_eq!(tree.children.len(), 2);
        assert!(matches!(
            tree.children[0].kind,
            BlockKind::Heading { level: 1 }
        ));
        assert!(matches!(tree.children[1].kind, BlockKind::Paragraph));
    }

    #[test]
    fn test_source_lines_are_zero_indexed() {
        let tree = parse_markdown("# Heading\n\nParagraph").unwrap();
        assert_eq!(tree.children[0].source_line, Some(0));
        assert_eq!(tree.children[1].source_line, Some(2));
    }

    #[test]
    fn test_parse_table_structure() {
        let markdown = "| H1 | H2 |\n|----|----|\n| a  | b  |";
        let tree = parse_markdown(markdown).unwrap();

        let table = tree
            .children
            .iter()
            .find(|n| matches!(n.kind, BlockKind::Table { .. }))
            .expect("table node");
        assert!(matches!(table.kind, BlockKind::Table { num_columns: 2 }));
        // Header row + one body row
        assert_eq!(table.children.len(), 2);
        assert!(matches!(
            table.children[0].kind,
            BlockKind::TableRow { header: true }
        ));
        assert_eq!(table.children[0].children.len(), 2);
        assert_eq!(table.children[1].children[1].text_content(), "b");
    }

    #[test]
    fn test_parse_code_block_literal() {
        let tree = parse_markdown("```rust\nlet x = 1;\nlet y = 2;\n```").unwrap();
        let code = &tree.children[0];
        match &code.kind {
            BlockKind::CodeBlock { language, literal } => {
                assert_eq!(language, "rust");
                assert_eq!(literal, "let x = 1;\nlet y = 2;\n");
            }
            other => panic!("expected code block, got {:?}", other),
        }
        assert_eq!(code.text_content(), "let x = 1;\nlet y = 2;\n");
    }

    #[test]
    fn test_text_content_strips_formatting() {
        let tree = parse_markdown("Hello **world**, *nice* `day`").unwrap();
        assert_eq!(tree.children[0].text_content(), "Hello world, nice day");
    }

    #[test]
    fn test_soft_break_renders_as_space() {
        let tree = parse_markdown("first\nsecond").unwrap();
        assert_eq!(tree.children[0].text_content(), "first second");
    }

    #[test]
    fn test_parse_task_list() {
        let tree = parse_markdown("- [x] done\n- [ ] todo").unwrap();
        let list = &tree.children[0];
        assert!(matches!(list.kind, BlockKind::List { ordered: false }));
        assert!(matches!(
            list.children[0].kind,
            BlockKind::TaskItem { checked: true }
        ));
        assert!(matches!(
            list.children[1].kind,
            BlockKind::TaskItem { checked: false }
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_node_at_path() {
        let tree = parse_markdown("# H\n\npara").unwrap();
        assert!(matches!(
            tree.node_at_path(&[1]).unwrap().kind,
            BlockKind::Paragraph
        ));
        assert!(tree.node_at_path(&[5]).is_none());
        assert_eq!(tree.node_at_path(&[]).unwrap().kind, BlockKind::Document);
    }

    #[test]
    fn test_find_by_source_line_exact() {
        let tree = parse_markdown("# H\n\npara one\n\npara two").unwrap();
        let path = tree
            .find_by_source_line(4, |n| n.is_text_block())
            .expect("block at line 4");
        assert_eq!(tree.node_at_path(&path).unwrap().text_content(), "para two");
    }

    #[test]
    fn test_find_by_source_line_closest_at_or_before() {
        let tree = parse_markdown("# H\n\npara one").unwrap();
        // Line 3 has no block; the paragraph at line 2 is the closest at-or-before
        let path = tree
            .find_by_source_line(3, |n| n.is_text_block())
            .expect("fallback block");
        assert_eq!(tree.node_at_path(&path).unwrap().text_content(), "para one");
    }

    #[test]
    fn test_find_by_source_line_ignores_untagged() {
        let tree = BlockNode::new(BlockKind::Document).with_children(vec![
            BlockNode::new(BlockKind::Paragraph)
                .with_children(vec![BlockNode::new(BlockKind::Text("untagged".into()))]),
            BlockNode::new(BlockKind::Paragraph)
                .with_source_line(5)
                .with_children(vec![BlockNode::new(BlockKind::Text("tagged".into()))]),
        ]);
        let path = tree
            .find_by_source_line(5, |n| n.is_text_block())
            .expect("tagged block");
        assert_eq!(tree.node_at_path(&path).unwrap().text_content(), "tagged");
    }
}
