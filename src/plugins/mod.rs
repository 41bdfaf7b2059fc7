//! Extension points for syntax the standard grammar doesn't know about.
//!
//! A [Plugin] can claim text at two levels:
//!
//! - **block**: at the start of any line outside fenced code, before the standard grammar sees it. See
//!   [`Plugin::match_block`].
//! - **inline**: at any position within a plain-text leaf the standard grammar produced. See
//!   [`Plugin::match_inline`].
//!
//! After the whole document is parsed, each plugin gets a [`Plugin::finalize`] call to post-process the tree; the
//! footnote plugin uses this to move definitions into the [FootnoteTable] and resolve references.
//!
//! Plugins live in a [PluginRegistry], which is handed to a [`crate::MarkdownParser`].
mod context;
mod definition_list;
mod footnotes;
mod registry;

pub use context::*;
pub use definition_list::DefinitionListPlugin;
pub use footnotes::FootnotePlugin;
pub use registry::*;

use crate::syntax::parser::MarkdownParser;
use crate::syntax::tree::{Inline, Node};
use crate::util::str_utils::strip_newline;

/// A syntax extension.
///
/// All methods have no-op defaults, so a plugin only implements the hooks it cares about. Plugins must be stateless
/// (any per-document state goes into the [PluginContext]), which is what lets one registry serve many parses at once.
pub trait Plugin: Send + Sync {
    /// A short identifier, used in log messages.
    fn name(&self) -> &str;

    /// Tries to claim a block starting at the cursor's position, which is always at the start of a line.
    fn match_block(&self, _cursor: &BlockCursor<'_>, _ctx: &mut PluginContext) -> Option<BlockMatch> {
        None
    }

    /// Tries to claim inline content starting at the cursor's position.
    fn match_inline(&self, _cursor: &InlineCursor<'_>, _ctx: &mut PluginContext) -> Option<InlineMatch> {
        None
    }

    /// Post-processes the top-level nodes once the whole document is parsed.
    fn finalize(&self, _roots: &mut Vec<Node>, _ctx: &mut PluginContext) {}
}

/// A block-level claim: `consumed` bytes of input, starting at the cursor, become `node`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockMatch {
    pub consumed: usize,
    pub node: Node,
}

/// An inline claim: `consumed` bytes of input, starting at the cursor, become `inlines`.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineMatch {
    pub consumed: usize,
    pub inlines: Vec<Inline>,
}

/// A position at the start of a line in the text being parsed.
pub struct BlockCursor<'a> {
    pub(crate) text: &'a str,
    pub(crate) pos: usize,
    pub(crate) at_block_start: bool,
    pub(crate) in_list_item: bool,
    pub(crate) parser: &'a MarkdownParser,
}

impl<'a> BlockCursor<'a> {
    /// Everything from the cursor to the end of the input.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// The current line, without its line terminator.
    pub fn line(&self) -> &'a str {
        let rest = self.rest();
        let line = match memchr::memchr(b'\n', rest.as_bytes()) {
            Some(idx) => &rest[..=idx],
            None => rest,
        };
        strip_newline(line)
    }

    /// Byte offset of the cursor within the text being parsed.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Whether the cursor sits at a block boundary: the start of the text, right after a blank line, or right after
    /// another plugin's block. Constructs that can't interrupt a paragraph should only match when this is `true`.
    pub fn at_block_start(&self) -> bool {
        self.at_block_start
    }

    /// Whether the cursor sits within a list item's content. Indented lines there belong to the item, so plugins
    /// should leave them alone.
    pub fn in_list_item(&self) -> bool {
        self.in_list_item
    }

    /// Parses `text` as nested block content, through the same parser and plugins.
    pub fn parse_blocks(&self, text: &str, ctx: &mut PluginContext) -> Vec<Node> {
        self.parser.parse_nested_blocks(text, ctx)
    }

    /// Parses `text` as nested inline content, through the same parser and plugins.
    pub fn parse_inlines(&self, text: &str, ctx: &mut PluginContext) -> Vec<Inline> {
        self.parser.parse_nested_inlines(text, ctx)
    }
}

/// A position within a plain-text leaf.
pub struct InlineCursor<'a> {
    pub(crate) text: &'a str,
    pub(crate) pos: usize,
}

impl<'a> InlineCursor<'a> {
    /// Everything from the cursor to the end of the text leaf.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// The character just before the cursor, if any.
    pub fn preceding_char(&self) -> Option<char> {
        self.text[..self.pos].chars().next_back()
    }

    pub fn offset(&self) -> usize {
        self.pos
    }
}

/// Checks a claim against the text it claims. Invalid claims are dropped (and logged); they never abort a parse.
pub(crate) fn valid_claim(plugin: &dyn Plugin, rest: &str, consumed: usize) -> bool {
    let valid = consumed > 0 && consumed <= rest.len() && rest.is_char_boundary(consumed);
    if !valid {
        log::debug!(
            "ignoring claim of {consumed} bytes from plugin {} (only {} bytes left)",
            plugin.name(),
            rest.len()
        );
    }
    valid
}
