use crate::plugins::PluginContext;
use crate::syntax::concatenate::Concatenate;
use crate::syntax::parser::MarkdownParser;
use crate::syntax::tree::*;
use markdown::mdast;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

macro_rules! mdx_nodes {
    {} => {
        mdast::Node::MdxJsxFlowElement(_)
        | mdast::Node::MdxjsEsm(_)
        | mdast::Node::MdxTextExpression(_)
        | mdast::Node::MdxJsxTextElement(_)
        | mdast::Node::MdxFlowExpression(_)
    };
}

/// Converts one segment's mdast into [Node]s.
///
/// Conversion never fails. Anything without a typed representation becomes an [UnknownNode] (or, inside inline
/// content, plain text) carrying the segment's source text for that node.
pub(crate) struct MdastReader<'a> {
    parser: &'a MarkdownParser,
    source: &'a str,
    link_definitions: HashMap<String, mdast::Definition>,
}

impl<'a> MdastReader<'a> {
    pub(crate) fn new(parser: &'a MarkdownParser, source: &'a str, root: &mdast::Node) -> Self {
        let mut result = Self {
            parser,
            source,
            link_definitions: HashMap::with_capacity(4), // guess
        };
        result.collect_definitions(root);
        result
    }

    pub(crate) fn read(&self, root: mdast::Node, ctx: &mut PluginContext) -> Vec<Node> {
        let mut result = Vec::new();
        self.block(root, ctx, &mut result);
        result
    }

    fn collect_definitions(&mut self, node: &mdast::Node) {
        match node {
            mdast::Node::Definition(def) if !is_footnote_label(&def.identifier) => {
                // first definition wins, the same as CommonMark's rule for link reference definitions
                if let Entry::Vacant(entry) = self.link_definitions.entry(def.identifier.to_owned()) {
                    entry.insert(def.clone());
                }
            }
            _ => {}
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    fn blocks(&self, children: Vec<mdast::Node>, ctx: &mut PluginContext) -> Vec<Node> {
        let mut result = Vec::with_capacity(children.len());
        for child in children {
            self.block(child, ctx, &mut result);
        }
        result
    }

    fn block(&self, node: mdast::Node, ctx: &mut PluginContext, out: &mut Vec<Node>) {
        let result = match node {
            mdast::Node::Root(node) => {
                out.extend(self.blocks(node.children, ctx));
                return;
            }
            mdast::Node::Blockquote(node) => Node::BlockQuote(BlockQuote {
                body: self.blocks(node.children, ctx),
            }),
            mdast::Node::List(node) => {
                let mut items = Vec::with_capacity(node.children.len());
                for child in node.children {
                    match child {
                        mdast::Node::ListItem(li) => items.push(ListItem {
                            checked: li.checked,
                            item: self.blocks(li.children, ctx),
                        }),
                        other => log::debug!("skipping non-item node directly under a list: {other:?}"),
                    }
                }
                Node::List(List {
                    ordered: node.ordered,
                    starting_index: if node.ordered { node.start } else { None },
                    items,
                })
            }
            mdast::Node::Code(node) => {
                let mdast::Code { value, lang, meta, .. } = node;
                Node::CodeBlock(CodeBlock {
                    language: lang,
                    metadata: meta,
                    value,
                })
            }
            mdast::Node::Math(node) => Node::CodeBlock(CodeBlock {
                language: Some("latex".to_string()),
                metadata: node.meta,
                value: node.value,
            }),
            mdast::Node::Toml(node) => Node::CodeBlock(CodeBlock {
                language: Some("toml".to_string()),
                metadata: None,
                value: node.value,
            }),
            mdast::Node::Yaml(node) => Node::CodeBlock(CodeBlock {
                language: Some("yaml".to_string()),
                metadata: None,
                value: node.value,
            }),
            mdast::Node::Heading(node) => Node::Heading(Heading {
                depth: node.depth,
                title: self.inlines(node.children, ctx),
            }),
            mdast::Node::Table(node) => {
                let mdast::Table { children, align, .. } = node;
                let mut rows = Vec::with_capacity(children.len());
                for row_node in children {
                    let mdast::Node::TableRow(row) = row_node else {
                        log::debug!("skipping non-row node directly under a table: {row_node:?}");
                        continue;
                    };
                    let mut cells = Vec::with_capacity(row.children.len());
                    for cell_node in row.children {
                        match cell_node {
                            mdast::Node::TableCell(cell) => cells.push(self.inlines(cell.children, ctx)),
                            other => cells.push(vec![Inline::plain(self.literal(&other))]),
                        }
                    }
                    rows.push(cells);
                }
                Node::Table(Table {
                    alignments: align.into_iter().map(convert_alignment).collect(),
                    rows,
                })
            }
            mdast::Node::ThematicBreak(_) => Node::ThematicBreak,
            mdast::Node::Definition(ref def) if is_footnote_label(&def.identifier) => {
                log::debug!("unclaimed footnote definition {:?}; keeping it as text", def.identifier);
                Node::literal_paragraph(self.literal(&node))
            }
            mdast::Node::Definition(_) => return,
            mdast::Node::Paragraph(node) => Node::Paragraph(Paragraph {
                body: self.inlines(node.children, ctx),
            }),
            mdast::Node::Html(node) => Node::BlockHtml(BlockHtml { value: node.value }),
            mdast::Node::FootnoteDefinition(_)
            | mdast::Node::ListItem(_)
            | mdast::Node::TableRow(_)
            | mdast::Node::TableCell(_) => self.unknown(&node),
            mdx_nodes! {} => self.unknown(&node),
            inline => Node::Paragraph(Paragraph {
                body: self.inlines(vec![inline], ctx),
            }),
        };
        out.push(result);
    }

    fn inlines(&self, children: Vec<mdast::Node>, ctx: &mut PluginContext) -> Vec<Inline> {
        let mut converted = Vec::with_capacity(children.len());
        for child in children {
            self.inline(child, ctx, &mut converted);
        }
        // The standard grammar can split one run of text into several leaves (around `[`, for instance), so join them
        // before the plugins look at them.
        let merged = Concatenate::concatenate_similar(converted);
        let mut scanned = Vec::with_capacity(merged.len());
        for inline in merged {
            match inline {
                Inline::Text(Text {
                    variant: TextVariant::Plain,
                    value,
                }) => scanned.extend(self.parser.scan_inlines(&value, ctx)),
                other => scanned.push(other),
            }
        }
        Concatenate::concatenate_similar(scanned)
    }

    fn inline(&self, node: mdast::Node, ctx: &mut PluginContext, out: &mut Vec<Inline>) {
        let result = match node {
            mdast::Node::LinkReference(_) | mdast::Node::ImageReference(_) if !self.is_resolved(&node) => {
                let literal = self.literal(&node);
                log::debug!("no link definition for {literal:?}; keeping it as text");
                Inline::plain(literal)
            }
            mdast::Node::Text(node) => Inline::plain(node.value),
            mdast::Node::Break(_) => Inline::plain("\n"),
            mdast::Node::InlineCode(node) => Inline::Text(Text {
                variant: TextVariant::Code,
                value: node.value,
            }),
            mdast::Node::InlineMath(node) => Inline::Text(Text {
                variant: TextVariant::Math,
                value: node.value,
            }),
            mdast::Node::Html(node) => Inline::Text(Text {
                variant: TextVariant::InlineHtml,
                value: node.value,
            }),
            mdast::Node::Delete(node) => Inline::Span(Span {
                variant: SpanVariant::Delete,
                children: self.inlines(node.children, ctx),
            }),
            mdast::Node::Emphasis(node) => Inline::Span(Span {
                variant: SpanVariant::Emphasis,
                children: self.inlines(node.children, ctx),
            }),
            mdast::Node::Strong(node) => Inline::Span(Span {
                variant: SpanVariant::Strong,
                children: self.inlines(node.children, ctx),
            }),
            mdast::Node::Link(node) => Inline::Link(Link {
                display: self.inlines(node.children, ctx),
                url: node.url,
                title: node.title,
            }),
            mdast::Node::LinkReference(node) => {
                let def = self.link_definitions.get(&node.identifier);
                Inline::Link(Link {
                    display: self.inlines(node.children, ctx),
                    url: def.map(|def| def.url.to_owned()).unwrap_or_default(),
                    title: def.and_then(|def| def.title.to_owned()),
                })
            }
            mdast::Node::Image(node) => Inline::Image(Image {
                alt: node.alt,
                url: node.url,
                title: node.title,
            }),
            mdast::Node::ImageReference(node) => {
                let def = self.link_definitions.get(&node.identifier);
                Inline::Image(Image {
                    alt: node.alt,
                    url: def.map(|def| def.url.to_owned()).unwrap_or_default(),
                    title: def.and_then(|def| def.title.to_owned()),
                })
            }
            mdast::Node::FootnoteReference(node) => {
                Inline::Footnote(FootnoteId::new(node.label.unwrap_or(node.identifier)))
            }
            other => Inline::plain(self.literal(&other)),
        };
        out.push(result);
    }

    /// Whether a link or image reference has a link definition to point at.
    fn is_resolved(&self, node: &mdast::Node) -> bool {
        let identifier = match node {
            mdast::Node::LinkReference(reference) => &reference.identifier,
            mdast::Node::ImageReference(reference) => &reference.identifier,
            _ => return true,
        };
        self.link_definitions.contains_key(identifier)
    }

    fn unknown(&self, node: &mdast::Node) -> Node {
        let kind = match node {
            mdast::Node::FootnoteDefinition(_) => "footnote_definition",
            mdast::Node::ListItem(_) => "list_item",
            mdast::Node::TableRow(_) => "table_row",
            mdast::Node::TableCell(_) => "table_cell",
            _ => "mdx",
        };
        log::debug!("no typed representation for {kind}; keeping its source text");
        Node::Unknown(UnknownNode {
            kind: kind.to_string(),
            literal: self.literal(node),
        })
    }

    /// The node's source text, or its text content if the node has no position.
    fn literal(&self, node: &mdast::Node) -> String {
        node.position()
            .and_then(|pos| self.source.get(pos.start.offset..pos.end.offset))
            .map(str::to_string)
            .unwrap_or_else(|| node.to_string())
    }
}

/// `[^label]` is footnote syntax, even where the standard grammar would take it for a link label.
pub(crate) fn is_footnote_label(identifier: &str) -> bool {
    identifier.starts_with('^')
}

fn convert_alignment(a: mdast::AlignKind) -> Option<ColumnAlignment> {
    match a {
        mdast::AlignKind::Left => Some(ColumnAlignment::Left),
        mdast::AlignKind::Right => Some(ColumnAlignment::Right),
        mdast::AlignKind::Center => Some(ColumnAlignment::Center),
        mdast::AlignKind::None => None,
    }
}
