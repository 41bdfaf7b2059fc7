//! Turns a [SyntaxDoc] into a flat sequence of [Block]s.
mod flatten;
mod numbering;

use crate::blocks::*;
use crate::plugins::FootnoteTable;
use crate::syntax::tree::{self, Node, SyntaxDoc};
use numbering::FootnoteNumbering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether footnotes that are defined but never referenced still get emitted (after the referenced ones).
    pub include_unreferenced_footnotes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_unreferenced_footnotes: true,
        }
    }
}

/// Renders parsed documents into blocks.
///
/// Rendering is a pure function of the document and the options: each top-level node becomes exactly one top-level
/// block, in order. Footnote definitions follow the body, numbered in the order their references first appear.
///
/// ```
/// use mdnotion::blocks::{Block, Run};
/// use mdnotion::{MarkdownParser, Renderer};
///
/// let doc = MarkdownParser::default().parse("Hello[^n].\n\n[^n]: A note.\n");
/// let blocks = Renderer::default().render(&doc);
/// assert_eq!(blocks.len(), 2);
/// let Block::FootnoteDefinition(note) = &blocks[1] else {
///     panic!("expected a footnote");
/// };
/// assert_eq!((note.label.as_str(), note.number), ("n", 1));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Renderer {
    options: RenderOptions,
}

pub(crate) struct RenderState<'a> {
    footnotes: &'a FootnoteTable,
    numbering: FootnoteNumbering,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, doc: &SyntaxDoc) -> Vec<Block> {
        let mut state = RenderState {
            footnotes: &doc.ctx.footnotes,
            numbering: FootnoteNumbering::default(),
        };
        let mut blocks: Vec<Block> = doc.roots.iter().map(|node| state.block(node)).collect();

        // Rendering a footnote can number new ones (references inside footnote bodies), so keep going until every
        // numbered footnote has been emitted.
        let mut unreferenced = doc.ctx.footnotes.labels();
        let mut emitted = 0;
        loop {
            if emitted < state.numbering.len() {
                emitted += 1;
                if let Some(footnote) = state.footnote(emitted) {
                    blocks.push(footnote);
                }
                continue;
            }
            if !self.options.include_unreferenced_footnotes {
                break;
            }
            match unreferenced.find(|label| !state.numbering.contains(label)) {
                Some(label) => {
                    state.numbering.number_for(label);
                }
                None => break,
            }
        }
        blocks
    }
}

impl RenderState<'_> {
    fn footnote(&mut self, number: usize) -> Option<Block> {
        let label = self.numbering.label_for(number)?.to_string();
        let footnotes = self.footnotes;
        let body = footnotes.get(&label)?;
        let children = self.blocks(body);
        Some(Block::FootnoteDefinition(FootnoteDefinition {
            label,
            number,
            children,
        }))
    }

    fn blocks(&mut self, nodes: &[Node]) -> Vec<Block> {
        nodes.iter().map(|node| self.block(node)).collect()
    }

    fn block(&mut self, node: &Node) -> Block {
        match node {
            Node::Paragraph(tree::Paragraph { body }) => Block::Paragraph(Paragraph {
                content: self.runs(body),
            }),
            Node::Heading(tree::Heading { depth, title }) => Block::Heading(Heading {
                level: *depth,
                content: self.runs(title),
            }),
            Node::BlockQuote(tree::BlockQuote { body }) => Block::Quote(Quote {
                children: self.blocks(body),
            }),
            Node::List(list) => Block::List(List {
                ordered: list.ordered,
                start: list.starting_index,
                items: list
                    .items
                    .iter()
                    .map(|li| ListItem {
                        checked: li.checked,
                        children: self.blocks(&li.item),
                    })
                    .collect(),
            }),
            Node::Table(table) => Block::Table(Table {
                alignments: table.alignments.iter().copied().map(Alignment::from).collect(),
                has_column_header: !table.rows.is_empty(),
                rows: table
                    .rows
                    .iter()
                    .map(|row| TableRow {
                        cells: row.iter().map(|cell| self.runs(cell)).collect(),
                    })
                    .collect(),
            }),
            Node::CodeBlock(code) => Block::Code(Code {
                language: code.language.clone(),
                content: code.value.clone(),
            }),
            Node::ThematicBreak => Block::Divider,
            Node::DefinitionList(list) => Block::DefinitionList(DefinitionList {
                items: list
                    .items
                    .iter()
                    .map(|item| DefinitionListItem {
                        term: self.runs(&item.term),
                        definitions: item.definitions.iter().map(|d| self.runs(d)).collect(),
                    })
                    .collect(),
            }),
            Node::BlockHtml(html) => Block::literal(&html.value),
            Node::FootnoteDefinition(def) => Block::literal(&def.source),
            Node::Unknown(unknown) => Block::literal(&unknown.literal),
        }
    }
}

impl From<Option<tree::ColumnAlignment>> for Alignment {
    fn from(value: Option<tree::ColumnAlignment>) -> Self {
        match value {
            Some(tree::ColumnAlignment::Left) => Self::Left,
            Some(tree::ColumnAlignment::Right) => Self::Right,
            Some(tree::ColumnAlignment::Center) => Self::Center,
            None => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::MarkdownParser;
    use crate::util::utils_for_test::*;
    use indoc::indoc;

    fn render(md: &str) -> Vec<Block> {
        Renderer::default().render(&MarkdownParser::default().parse(md))
    }

    fn reference(label: &str, number: usize) -> Run {
        Run::FootnoteReference(FootnoteReference {
            label: label.to_string(),
            number,
        })
    }

    fn footnote_numbers(blocks: &[Block]) -> Vec<(String, usize)> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::FootnoteDefinition(def) => Some((def.label.clone(), def.number)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn one_block_per_top_level_node() {
        let blocks = render(indoc! {r"
            # Title

            Para.

            > Quote

            ---

            ```rust
            fn main() {}
            ```
            "});
        assert_eq!(
            blocks.iter().map(Block::kind).collect::<Vec<_>>(),
            vec![
                BlockKind::Heading,
                BlockKind::Paragraph,
                BlockKind::Quote,
                BlockKind::Divider,
                BlockKind::Code,
            ]
        );
        assert_eq!(
            blocks[4],
            Block::Code(Code {
                language: Some("rust".to_string()),
                content: "fn main() {}".to_string(),
            })
        );
    }

    #[test]
    fn footnotes_follow_body() {
        let blocks = render(indoc! {r"
            Second[^b] then first[^a].

            [^a]: A.
            [^b]: B.
            "});
        assert_eq!(
            blocks[0],
            Block::Paragraph(Paragraph {
                content: vec![
                    Run::plain("Second"),
                    reference("b", 1),
                    Run::plain(" then first"),
                    reference("a", 2),
                    Run::plain("."),
                ]
            })
        );
        assert_eq!(footnote_numbers(&blocks), vec![("b".to_string(), 1), ("a".to_string(), 2)]);
        assert_eq!(
            blocks[1],
            Block::FootnoteDefinition(FootnoteDefinition {
                label: "b".to_string(),
                number: 1,
                children: vec![Block::literal("B.")],
            })
        );
    }

    #[test]
    fn references_in_footnotes_get_numbers() {
        let blocks = render(indoc! {r"
            Text[^1].

            [^1]: See also[^2].
            [^2]: Cycle back[^1].
            [^3]: Never referenced.
            "});
        assert_eq!(
            footnote_numbers(&blocks),
            vec![("1".to_string(), 1), ("2".to_string(), 2), ("3".to_string(), 3)]
        );
        unwrap!(&blocks[1], Block::FootnoteDefinition(first));
        assert_eq!(
            first.children,
            vec![Block::Paragraph(Paragraph {
                content: vec![Run::plain("See also"), reference("2", 2), Run::plain(".")],
            })]
        );
    }

    #[test]
    fn unreferenced_footnotes_can_be_dropped() {
        let doc = MarkdownParser::default().parse("Text[^a].\n\n[^a]: A\n[^b]: B\n");
        let blocks = Renderer::new(RenderOptions {
            include_unreferenced_footnotes: false,
        })
        .render(&doc);
        assert_eq!(footnote_numbers(&blocks), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn unresolved_reference_is_literal() {
        let blocks = render("Text[^nowhere].");
        assert_eq!(blocks, vec![Block::literal("Text[^nowhere].")]);
    }

    #[test]
    fn custom_syntax_renders_verbatim() {
        let blocks = render("{{custom}}");
        assert_eq!(blocks, vec![Block::literal("{{custom}}")]);
    }

    #[test]
    fn html_renders_verbatim() {
        let blocks = render("<div>\nhi\n</div>\n");
        assert_eq!(blocks, vec![Block::literal("<div>\nhi\n</div>")]);
    }

    #[test]
    fn table_shape() {
        let blocks = render(indoc! {r"
            | Name | Value |
            |:-----|:-----:|
            | a    | 1     |
            "});
        unwrap!(get_only(blocks), Block::Table(table));
        assert_eq!(table.width(), 2);
        assert!(table.has_column_header);
        assert_eq!(table.alignments, vec![Alignment::Left, Alignment::Center]);
        assert_eq!(table.header_rows().len(), 1);
        assert_eq!(
            table.data_rows(),
            &[TableRow {
                cells: vec![vec![Run::plain("a")], vec![Run::plain("1")]],
            }]
        );
    }

    #[test]
    fn task_list() {
        let blocks = render("3. [ ] todo\n4. [x] done\n");
        unwrap!(get_only(blocks), Block::List(list));
        assert!(list.ordered);
        assert_eq!(list.start, Some(3));
        assert_eq!(
            list.items,
            vec![
                ListItem {
                    checked: Some(false),
                    children: vec![Block::literal("todo")],
                },
                ListItem {
                    checked: Some(true),
                    children: vec![Block::literal("done")],
                },
            ]
        );
    }

    #[test]
    fn definition_list() {
        let blocks = render("Term\n: *Meaning*\n");
        assert_eq!(
            blocks,
            vec![Block::DefinitionList(DefinitionList {
                items: vec![DefinitionListItem {
                    term: vec![Run::plain("Term")],
                    definitions: vec![vec![Run::Text(TextRun {
                        content: "Meaning".to_string(),
                        style: InlineStyle {
                            italic: true,
                            ..InlineStyle::PLAIN
                        },
                        link: None,
                    })]],
                }],
            })]
        );
    }

    #[test]
    fn deterministic() {
        let md = "A[^x] *b* [c](https://example.com)\n\n[^x]: x\n";
        assert_eq!(render(md), render(md));
    }
}
