//! Markdown to syntax tree.
//!
//! [parser::MarkdownParser] reads standard Markdown (with GFM tables, task lists, and strikethrough) and hands the
//! rest to the [plugins](crate::plugins) in its registry. The result is a [tree::SyntaxDoc]: the root [tree::Node]s,
//! plus whatever the plugins accumulated along the way, like footnote definitions.
//!
//! ```
//! use mdnotion::syntax::tree::{Inline, Node};
//! use mdnotion::MarkdownParser;
//!
//! let doc = MarkdownParser::default().parse("Hello[^1].\n\n[^1]: A footnote.\n");
//! let [Node::Paragraph(paragraph)] = doc.roots.as_slice() else {
//!     panic!("expected one paragraph");
//! };
//! assert!(matches!(&paragraph.body[1], Inline::Footnote(id) if id.label == "1"));
//! assert!(doc.ctx.footnotes.contains("1"));
//! ```
pub(crate) mod concatenate;
mod from_mdast;
pub mod parser;
pub mod tree;
pub(crate) mod tree_test_utils;
