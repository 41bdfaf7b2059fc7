use crate::plugins::PluginContext;
use crate::syntax::concatenate::Concatenate;
use std::mem;

/// A fully parsed Markdown document.
///
/// This comprises the root (top-level) [Node]s, as well as the [PluginContext] the plugins filled in while parsing.
/// The footnote table lives in the context: footnote definitions are pulled out of `roots` and stored there, keyed by
/// label.
///
/// See [`crate::MarkdownParser::parse`] for how to create one.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct SyntaxDoc {
    pub roots: Vec<Node>,
    pub ctx: PluginContext,
}

/// A single block-level node of the parsed Markdown.
///
/// These come in two flavors:
///
/// - block containers, which contain other `Node`s within them ([BlockQuote], [List], and the plugin-produced
///   [FootnoteDefinition])
/// - leaf blocks, which contain [Inline]s or scalar values
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    // Container blocks
    BlockQuote(BlockQuote),
    List(List),

    // Leaf blocks
    Heading(Heading),
    Paragraph(Paragraph),
    Table(Table),
    CodeBlock(CodeBlock),
    /// A thematic break:
    ///
    /// ```markdown
    /// -----
    /// ```
    ThematicBreak,
    BlockHtml(BlockHtml),

    // Produced by plugins
    DefinitionList(DefinitionList),
    FootnoteDefinition(FootnoteDefinition),

    /// Syntax that has no typed representation. The literal source text is kept so it can be rendered verbatim.
    Unknown(UnknownNode),
}

/// Inline content: text, styled spans, links, images and footnote references.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Inline {
    Footnote(FootnoteId),
    Span(Span),
    Image(Image),
    Link(Link),
    Text(Text),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockQuote {
    pub body: Vec<Node>,
}

/// An ordered or unordered list.
///
/// `starting_index` is only ever `Some` for ordered lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub starting_index: Option<u32>,
    pub items: Vec<ListItem>,
}

/// A list item. `checked` is `Some` for task items (`- [ ]` or `- [x]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub checked: Option<bool>,
    pub item: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub depth: u8,
    pub title: Vec<Inline>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    pub body: Vec<Inline>,
}

/// A table. The first row is always the header row.
///
/// Rows are not normalized: a row may have fewer or more cells than `alignments` has columns. That's left to whoever
/// consumes the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub alignments: Vec<Option<ColumnAlignment>>,
    pub rows: Vec<TableRow>,
}

pub type TableRow = Vec<TableCell>;
pub type TableCell = Vec<Inline>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
}

/// A fenced or indented code block. Math blocks and front matter also land here, with a synthesized language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub metadata: Option<String>,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHtml {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionList {
    pub items: Vec<DefinitionItem>,
}

/// One term and its definitions.
///
/// ```markdown
/// Term
/// : first definition
/// : second definition
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionItem {
    pub term: Vec<Inline>,
    pub definitions: Vec<Vec<Inline>>,
}

/// A footnote definition, as produced by the footnote plugin.
///
/// These only appear in the tree between the block pass and the footnote plugin's finalize step. After that, the first
/// definition for each label lives in the context's footnote table, and duplicates have been degraded to literal
/// paragraphs of their `source`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FootnoteDefinition {
    pub id: FootnoteId,
    pub body: Vec<Node>,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownNode {
    pub kind: String,
    pub literal: String,
}

/// A footnote reference, like `[^1]`. The label does not include the caret.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FootnoteId {
    pub label: String,
}

impl FootnoteId {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// The reference as it appears in the source, `[^label]`.
    pub fn as_source(&self) -> String {
        format!("[^{}]", self.label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub variant: SpanVariant,
    pub children: Vec<Inline>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanVariant {
    Delete,
    Emphasis,
    Strong,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Text {
    pub variant: TextVariant,
    pub value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextVariant {
    Plain,
    Code,
    Math,
    InlineHtml,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub display: Vec<Inline>,
    pub url: String,
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Image {
    pub alt: String,
    pub url: String,
    pub title: Option<String>,
}

impl Inline {
    pub fn plain(value: impl Into<String>) -> Self {
        Inline::Text(Text {
            variant: TextVariant::Plain,
            value: value.into(),
        })
    }
}

impl Node {
    /// A paragraph holding `literal` as a single plain text run. This is how anything that can't be represented
    /// otherwise ends up in the output.
    pub fn literal_paragraph(literal: impl Into<String>) -> Self {
        Node::Paragraph(Paragraph {
            body: vec![Inline::plain(literal)],
        })
    }

    /// Calls `f` on every inline sequence within this node, including the ones nested in spans and link texts.
    ///
    /// Nested sequences are visited before the sequence that contains them.
    pub fn visit_inlines_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Vec<Inline>),
    {
        match self {
            Node::BlockQuote(BlockQuote { body }) | Node::FootnoteDefinition(FootnoteDefinition { body, .. }) => {
                body.iter_mut().for_each(|node| node.visit_inlines_mut(f));
            }
            Node::List(list) => {
                for li in &mut list.items {
                    li.item.iter_mut().for_each(|node| node.visit_inlines_mut(f));
                }
            }
            Node::Heading(Heading { title: inlines, .. }) | Node::Paragraph(Paragraph { body: inlines }) => {
                visit_inline_seq(inlines, f);
            }
            Node::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|row| row.iter_mut()) {
                    visit_inline_seq(cell, f);
                }
            }
            Node::DefinitionList(list) => {
                for item in &mut list.items {
                    visit_inline_seq(&mut item.term, f);
                    for definition in &mut item.definitions {
                        visit_inline_seq(definition, f);
                    }
                }
            }
            Node::CodeBlock(_) | Node::ThematicBreak | Node::BlockHtml(_) | Node::Unknown(_) => {}
        }
    }
}

fn visit_inline_seq<F>(inlines: &mut Vec<Inline>, f: &mut F)
where
    F: FnMut(&mut Vec<Inline>),
{
    for inline in inlines.iter_mut() {
        match inline {
            Inline::Span(Span { children, .. }) => visit_inline_seq(children, f),
            Inline::Link(Link { display, .. }) => visit_inline_seq(display, f),
            Inline::Footnote(_) | Inline::Image(_) | Inline::Text(_) => {}
        }
    }
    f(inlines);
}

impl Concatenate for Inline {
    fn try_concatenate(&mut self, mut other: Self) -> Result<(), Self> {
        match (self, &mut other) {
            (Self::Span(my), Self::Span(other)) if my.variant == other.variant => {
                // After joining the two spans, their boundary children may be joinable too.
                my.children.append(&mut other.children);
                my.children = Concatenate::concatenate_similar(mem::take(&mut my.children));
                Ok(())
            }
            (Self::Text(my), Self::Text(other))
                if my.variant == TextVariant::Plain && other.variant == TextVariant::Plain =>
            {
                // Only plain text; `x + y` and `1 + 2` as two code spans are not `x + y1 + 2`.
                my.value.push_str(&other.value);
                Ok(())
            }
            _ => Err(other),
        }
    }
}

macro_rules! from_for_node {
    ($elem:ident ($inner:ident)) => {
        impl From<$inner> for Node {
            fn from(value: $inner) -> Self {
                Node::$elem(value)
            }
        }
    };
    ($elem:ident) => {
        from_for_node! {$elem ($elem)}
    };
}

from_for_node! { BlockQuote }
from_for_node! { List }
from_for_node! { Heading }
from_for_node! { Paragraph }
from_for_node! { Table }
from_for_node! { CodeBlock }
from_for_node! { BlockHtml }
from_for_node! { DefinitionList }
from_for_node! { FootnoteDefinition }
from_for_node! { Unknown (UnknownNode) }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tree_test_utils::*;

    #[test]
    fn plain_texts_concatenate() {
        let merged = Concatenate::concatenate_similar(inlines!["hello", " ", "world"]);
        assert_eq!(merged, inlines!["hello world"]);
    }

    #[test]
    fn code_texts_do_not_concatenate() {
        let code = |s: &str| {
            Inline::Text(Text {
                variant: TextVariant::Code,
                value: s.to_string(),
            })
        };
        let merged = Concatenate::concatenate_similar(vec![code("x + y"), code("1 + 2")]);
        assert_eq!(merged, vec![code("x + y"), code("1 + 2")]);
    }

    #[test]
    fn same_spans_concatenate_recursively() {
        let merged = Concatenate::concatenate_similar(inlines![strong["one "], strong["two"]]);
        assert_eq!(merged, inlines![strong["one two"]]);
    }

    #[test]
    fn different_spans_stay_apart() {
        let merged = Concatenate::concatenate_similar(inlines![strong["one"], em["two"]]);
        assert_eq!(merged, inlines![strong["one"], em["two"]]);
    }

    #[test]
    fn visit_reaches_nested_inlines() {
        let mut node = Node::BlockQuote(BlockQuote {
            body: vec![
                Node::Paragraph(Paragraph {
                    body: inlines!["a", strong["b", link["c"]("https://example.com")]],
                }),
                Node::Table(Table {
                    alignments: vec![None],
                    rows: vec![vec![inlines!["d"]]],
                }),
            ],
        });
        let mut seen = Vec::new();
        node.visit_inlines_mut(&mut |inlines: &mut Vec<Inline>| seen.push(inlines.len()));
        // link display, strong children, paragraph body, table cell
        assert_eq!(seen, vec![1, 2, 2, 1]);
    }

    #[test]
    fn visit_can_rewrite() {
        let mut node = Node::Paragraph(Paragraph {
            body: inlines!["a", footnote["x"], "b"],
        });
        node.visit_inlines_mut(&mut |inlines: &mut Vec<Inline>| {
            for inline in inlines.iter_mut() {
                if let Inline::Footnote(id) = inline {
                    *inline = Inline::plain(id.as_source());
                }
            }
            *inlines = Concatenate::concatenate_similar(mem::take(inlines));
        });
        assert_eq!(node, Node::literal_paragraph("a[^x]b"));
    }

    #[test]
    fn literal_paragraph() {
        assert_eq!(
            Node::literal_paragraph("{{custom}}"),
            Node::Paragraph(Paragraph {
                body: inlines!["{{custom}}"]
            })
        );
    }
}
