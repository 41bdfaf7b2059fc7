use crate::plugins::{valid_claim, BlockCursor, BlockMatch, InlineCursor, PluginContext, PluginRegistry, Precedence};
use crate::plugins::{DefinitionListPlugin, FootnotePlugin};
use crate::syntax::concatenate::Concatenate;
use crate::syntax::from_mdast::{is_footnote_label, MdastReader};
use crate::syntax::tree::{Inline, Node, SyntaxDoc};
use crate::util::str_utils::{is_blank, leading_indent, split_lines_inclusive, strip_newline};
use fancy_regex::Regex;
use markdown::mdast;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

/// Nested parses (footnote bodies, definition-list content) deeper than this degrade to literal text.
pub const MAX_NESTING_DEPTH: usize = 8;

/// Which built-in plugins a parser gets, and how plugins are ordered against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    pub footnotes: bool,
    pub definition_lists: bool,
    pub precedence: Precedence,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            footnotes: true,
            definition_lists: true,
            precedence: Precedence::default(),
        }
    }
}

impl ParserOptions {
    pub fn registry(&self) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        if self.footnotes {
            registry.register(Arc::new(FootnotePlugin));
        }
        if self.definition_lists {
            registry.register(Arc::new(DefinitionListPlugin));
        }
        registry.set_precedence(self.precedence);
        registry
    }
}

/// Parses Markdown into a [SyntaxDoc], consulting its plugins along the way.
///
/// The parser is immutable once built, so one instance can be shared between threads and reused for any number of
/// documents. Parsing never fails; malformed input degrades to literal text.
///
/// ```
/// use mdnotion::syntax::tree::Node;
/// use mdnotion::MarkdownParser;
///
/// let doc = MarkdownParser::default().parse("# Title\n\nSome text[^1].\n\n[^1]: A note.\n");
/// assert_eq!(doc.roots.len(), 2);
/// assert!(matches!(doc.roots[0], Node::Heading(_)));
/// assert!(doc.ctx.footnotes.contains("1"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MarkdownParser {
    registry: Arc<PluginRegistry>,
}

impl MarkdownParser {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn with_options(options: &ParserOptions) -> Self {
        Self::new(options.registry())
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn parse(&self, text: &str) -> SyntaxDoc {
        let mut ctx = PluginContext {
            link_definitions: link_definitions(text),
            ..Default::default()
        };
        let mut roots = self.parse_blocks(text, &mut ctx);
        for plugin in self.registry.iter() {
            plugin.finalize(&mut roots, &mut ctx);
        }
        SyntaxDoc { roots, ctx }
    }

    pub(crate) fn parse_nested_blocks(&self, text: &str, ctx: &mut PluginContext) -> Vec<Node> {
        if ctx.depth >= MAX_NESTING_DEPTH {
            log::debug!("nesting deeper than {MAX_NESTING_DEPTH}; keeping content as literal text");
            let literal = text.trim();
            return if literal.is_empty() {
                Vec::new()
            } else {
                vec![Node::literal_paragraph(literal)]
            };
        }
        ctx.depth += 1;
        let nodes = self.parse_blocks(text, ctx);
        ctx.depth -= 1;
        nodes
    }

    /// Parses `text` as blocks and joins the results back into one inline sequence. Paragraphs and headings
    /// contribute their inlines, separated by line breaks; if anything else shows up, the whole text is kept literally.
    pub(crate) fn parse_nested_inlines(&self, text: &str, ctx: &mut PluginContext) -> Vec<Inline> {
        let nodes = self.parse_nested_blocks(text, ctx);
        let mut result = Vec::new();
        for node in nodes {
            if !result.is_empty() {
                result.push(Inline::plain("\n"));
            }
            match node {
                Node::Paragraph(p) => result.extend(p.body),
                Node::Heading(h) => result.extend(h.title),
                _ => return vec![Inline::plain(text.trim())],
            }
        }
        Concatenate::concatenate_similar(result)
    }

    /// The block pass: walks the text line by line, giving plugins first pick at each line start outside fenced
    /// code. Everything between plugin claims goes to the standard grammar as one segment.
    fn parse_blocks(&self, text: &str, ctx: &mut PluginContext) -> Vec<Node> {
        let mut nodes = Vec::new();
        if self.registry.is_empty() {
            self.parse_segment(text, ctx, &mut nodes);
            return nodes;
        }

        let mut segment_start = 0;
        let mut pos = 0;
        let mut at_block_start = true;
        let mut fence: Option<Fence> = None;
        let mut list = ListTracker::default();
        while pos < text.len() {
            if fence.is_none() {
                let cursor = BlockCursor {
                    text,
                    pos,
                    at_block_start,
                    in_list_item: list.in_item,
                    parser: self,
                };
                if let Some(claim) = self.match_block(&cursor, ctx) {
                    self.parse_segment(&text[segment_start..pos], ctx, &mut nodes);
                    nodes.push(claim.node);
                    pos += claim.consumed;
                    segment_start = pos;
                    at_block_start = true;
                    list = ListTracker::default();
                    continue;
                }
            }
            let Some(line) = split_lines_inclusive(&text[pos..]).next() else {
                break;
            };
            pos += line.len();
            list.see(line);
            fence = match fence {
                Some(open) if open.is_closed_by(line) => None,
                Some(open) => Some(open),
                None => Fence::open(line),
            };
            at_block_start = fence.is_none() && is_blank(line);
        }
        self.parse_segment(&text[segment_start..], ctx, &mut nodes);
        nodes
    }

    fn match_block(&self, cursor: &BlockCursor<'_>, ctx: &mut PluginContext) -> Option<BlockMatch> {
        let rest = cursor.rest();
        for plugin in self.registry.iter() {
            if let Some(claim) = plugin.match_block(cursor, ctx) {
                if valid_claim(plugin, rest, claim.consumed) {
                    log::debug!("plugin {} claimed {} bytes at {}", plugin.name(), claim.consumed, cursor.offset());
                    return Some(claim);
                }
            }
        }
        None
    }

    fn parse_segment(&self, segment: &str, ctx: &mut PluginContext, nodes: &mut Vec<Node>) {
        if is_blank(segment) {
            return;
        }
        let source = with_link_definitions(segment, &ctx.link_definitions);
        match markdown::to_mdast(&source, &mdast_options()) {
            Ok(root) => {
                let reader = MdastReader::new(self, &source, &root);
                nodes.extend(reader.read(root, ctx));
            }
            Err(err) => {
                log::warn!("couldn't parse a segment of {} bytes, keeping it as literal text: {err}", segment.len());
                nodes.push(Node::literal_paragraph(segment.trim()));
            }
        }
    }

    /// The inline pass over one plain-text leaf.
    pub(crate) fn scan_inlines(&self, text: &str, ctx: &mut PluginContext) -> Vec<Inline> {
        if self.registry.is_empty() {
            return vec![Inline::plain(text)];
        }
        let mut result = Vec::new();
        let mut plain_start = 0;
        let mut pos = 0;
        while pos < text.len() {
            let cursor = InlineCursor { text, pos };
            let claim = self.registry.iter().find_map(|plugin| {
                plugin
                    .match_inline(&cursor, ctx)
                    .filter(|claim| valid_claim(plugin, cursor.rest(), claim.consumed))
            });
            match claim {
                Some(claim) => {
                    if plain_start < pos {
                        result.push(Inline::plain(&text[plain_start..pos]));
                    }
                    result.extend(claim.inlines);
                    pos += claim.consumed;
                    plain_start = pos;
                }
                None => pos += text[pos..].chars().next().map_or(1, char::len_utf8),
            }
        }
        if plain_start < text.len() {
            result.push(Inline::plain(&text[plain_start..]));
        }
        result
    }
}

/// The standard grammar's options: CommonMark + GFM, minus GFM footnotes (those belong to the footnote plugin).
fn mdast_options() -> markdown::ParseOptions {
    markdown::ParseOptions {
        constructs: markdown::Constructs {
            gfm_footnote_definition: false,
            gfm_label_start_footnote: false,
            ..markdown::Constructs::gfm()
        },
        ..markdown::ParseOptions::gfm()
    }
}

/// Every link reference definition in the document, rewritten one per line.
///
/// Plugin blocks split the document into segments that the standard grammar parses separately, but a link reference
/// can use a definition from anywhere in the document. Each segment is parsed with these definitions in front of it.
/// Footnote-style labels (`[^label]`) are left out; those belong to the footnote plugin.
fn link_definitions(text: &str) -> String {
    if !text.contains("]:") {
        return String::new();
    }
    let root = match markdown::to_mdast(text, &mdast_options()) {
        Ok(root) => root,
        Err(err) => {
            log::warn!("couldn't scan for link definitions: {err}");
            return String::new();
        }
    };
    let mut definitions = String::new();
    collect_link_definitions(&root, &mut definitions);
    definitions
}

fn collect_link_definitions(node: &mdast::Node, out: &mut String) {
    if let mdast::Node::Definition(def) = node {
        if !is_footnote_label(&def.identifier) {
            out.push('[');
            out.push_str(def.label.as_deref().unwrap_or(&def.identifier));
            out.push_str("]: <");
            out.push_str(&escape_punctuation(&def.url));
            out.push('>');
            if let Some(title) = &def.title {
                out.push_str(" \"");
                out.push_str(&escape_punctuation(title));
                out.push('"');
            }
            out.push('\n');
        }
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_link_definitions(child, out);
        }
    }
}

/// Backslash-escapes ASCII punctuation, so that the standard grammar reads the text back exactly as given.
fn escape_punctuation(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_punctuation() {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn with_link_definitions<'a>(segment: &'a str, definitions: &str) -> Cow<'a, str> {
    if definitions.is_empty() {
        Cow::Borrowed(segment)
    } else {
        Cow::Owned(format!("{definitions}\n{segment}"))
    }
}

/// Follows list items through the block pass: a list item's content runs until a blank line is followed by an
/// unindented line that doesn't start another item.
#[derive(Clone, Copy, Debug, Default)]
struct ListTracker {
    in_item: bool,
    after_blank: bool,
}

impl ListTracker {
    fn see(&mut self, line: &str) {
        if is_blank(line) {
            self.after_blank = true;
            return;
        }
        if starts_list_item(line) {
            self.in_item = true;
        } else if self.after_blank && leading_indent(line) == 0 {
            self.in_item = false;
        }
        self.after_blank = false;
    }
}

fn starts_list_item(line: &str) -> bool {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    static THEMATIC_BREAK: OnceLock<Regex> = OnceLock::new();
    let marker = MARKER.get_or_init(|| Regex::new(r"^ {0,3}(?:[-*+]|\d{1,9}[.)])(?:[ \t]|$)").expect("internal error"));
    let thematic_break = THEMATIC_BREAK.get_or_init(|| {
        Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").expect("internal error")
    });
    let line = strip_newline(line);
    marker.is_match(line).unwrap_or(false) && !thematic_break.is_match(line).unwrap_or(false)
}

/// An open fenced code block. Plugins aren't consulted inside one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fence {
    marker: u8,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let trimmed = fence_line(line)?;
        let marker = *trimmed.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = trimmed.bytes().take_while(|&b| b == marker).count();
        if len < 3 {
            return None;
        }
        // a backtick fence's info string can't contain backticks (otherwise it's an inline code span)
        if marker == b'`' && trimmed[len..].contains('`') {
            return None;
        }
        Some(Self { marker, len })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let Some(trimmed) = fence_line(line) else {
            return false;
        };
        let len = trimmed.bytes().take_while(|&b| b == self.marker).count();
        len >= self.len && trimmed[len..].trim().is_empty()
    }
}

/// The line without its indentation, if it's indented little enough to be a fence line (4 columns would make it
/// indented code).
fn fence_line(line: &str) -> Option<&str> {
    let line = strip_newline(line);
    (leading_indent(line) < 4).then(|| line.trim_start_matches([' ', '\t']))
}
