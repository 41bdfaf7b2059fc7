//! Converts Markdown into Notion blocks.
//!
//! The pipeline has three stages:
//!
//! 1. [syntax]: a [MarkdownParser] turns text into a syntax tree. Standard Markdown comes from the `markdown` crate;
//!    everything else (footnotes, definition lists, or your own syntax) comes from [plugins] in a
//!    [PluginRegistry].
//! 2. [render]: a [Renderer] turns that tree into typed [blocks::Block]s, flattening nested inline styles into runs
//!    and numbering footnotes.
//! 3. [wire]: blocks become the JSON objects the Notion API accepts, optionally batched into request bodies.
//!
//! [run] ties these together for the CLI.
//!
//! ```
//! use mdnotion::blocks::{Block, Run};
//!
//! let blocks = mdnotion::markdown_to_blocks("# Hello\n\nSome **bold** text.");
//! assert_eq!(blocks.len(), 2);
//! assert!(matches!(&blocks[0], Block::Heading(h) if h.level == 1 && h.content == vec![Run::plain("Hello")]));
//! ```
pub mod blocks;
pub mod plugins;
pub mod render;
pub mod run;
pub mod syntax;
mod util;
pub mod wire;

pub use plugins::{Plugin, PluginRegistry, Precedence};
pub use render::{RenderOptions, Renderer};
pub use syntax::parser::{MarkdownParser, ParserOptions};
pub use syntax::tree::SyntaxDoc;

/// Parses and renders `markdown` with the default plugins (footnotes and definition lists) and options.
pub fn markdown_to_blocks(markdown: &str) -> Vec<blocks::Block> {
    let doc = MarkdownParser::default().parse(markdown);
    Renderer::default().render(&doc)
}
