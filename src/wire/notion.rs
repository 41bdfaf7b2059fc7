use crate::blocks::*;
use crate::syntax::concatenate::Concatenate;
use crate::wire::language::notion_language;
use crate::wire::rich_text::{footnote_marker, plain_rich_text, rich_text};
use crate::wire::WireOptions;
use serde_json::{Map, Value};

/// Converts one block into the blocks the API expects. Most kinds map one to one; lists and definition lists expand
/// to one wire block per item.
pub fn block_to_notion(block: &Block, options: &WireOptions) -> Vec<Value> {
    match block {
        Block::Paragraph(paragraph) => vec![paragraph_block(&paragraph.content, &[], options)],
        Block::Heading(heading) => vec![heading_block(heading, options)],
        Block::List(list) => list.items.iter().map(|item| list_item_block(list, item, options)).collect(),
        Block::Table(table) => vec![table_block(table, options)],
        Block::Code(code) => vec![code_block(code)],
        Block::Quote(quote) => vec![quote_block(quote, options)],
        Block::Divider => vec![wire_block("divider", Map::new())],
        Block::DefinitionList(list) => list
            .items
            .iter()
            .map(|item| definition_item_block(item, options))
            .collect(),
        Block::FootnoteDefinition(footnote) => vec![footnote_block(footnote, options)],
    }
}

fn children_to_notion(children: &[Block], options: &WireOptions) -> Vec<Value> {
    children.iter().flat_map(|child| block_to_notion(child, options)).collect()
}

/// `{"object": "block", "type": kind, kind: body}`
fn wire_block(kind: &str, body: Map<String, Value>) -> Value {
    let mut block = Map::new();
    block.insert("object".to_string(), Value::from("block"));
    block.insert("type".to_string(), Value::from(kind));
    block.insert(kind.to_string(), Value::Object(body));
    Value::Object(block)
}

/// A body with `rich_text`, plus `children` if there are any.
fn text_body(rich_text: Vec<Value>, children: Vec<Value>) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("rich_text".to_string(), Value::Array(rich_text));
    if !children.is_empty() {
        body.insert("children".to_string(), Value::Array(children));
    }
    body
}

/// Blocks like list items and quotes have their own text, followed by nested children. If the content starts with a
/// paragraph, that paragraph becomes the text; everything else becomes children.
fn split_leading_text<'a>(children: &'a [Block]) -> (&'a [Run], &'a [Block]) {
    match children.split_first() {
        Some((Block::Paragraph(paragraph), rest)) => (&paragraph.content, rest),
        _ => (&[] as &[Run], children),
    }
}

fn paragraph_block(content: &[Run], children: &[Block], options: &WireOptions) -> Value {
    wire_block(
        "paragraph",
        text_body(rich_text(content, options), children_to_notion(children, options)),
    )
}

fn heading_block(heading: &Heading, options: &WireOptions) -> Value {
    let kind = match heading.level {
        0 | 1 => "heading_1",
        2 => "heading_2",
        _ => "heading_3",
    };
    wire_block(kind, text_body(rich_text(&heading.content, options), Vec::new()))
}

fn list_item_block(list: &List, item: &ListItem, options: &WireOptions) -> Value {
    let (text, rest) = split_leading_text(&item.children);
    let mut body = text_body(rich_text(text, options), children_to_notion(rest, options));
    let kind = match (item.checked, list.ordered) {
        (Some(checked), _) => {
            body.insert("checked".to_string(), Value::Bool(checked));
            "to_do"
        }
        (None, true) => "numbered_list_item",
        (None, false) => "bulleted_list_item",
    };
    wire_block(kind, body)
}

fn table_block(table: &Table, options: &WireOptions) -> Value {
    let width = table.width();
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<Value> = row
                .cells
                .iter()
                .take(width)
                .map(|cell| Value::Array(rich_text(cell, options)))
                .collect();
            cells.resize(width, Value::Array(Vec::new()));
            wire_block("table_row", Map::from_iter([("cells".to_string(), Value::Array(cells))]))
        })
        .collect();
    let mut body = Map::new();
    body.insert("table_width".to_string(), Value::from(width));
    body.insert("has_column_header".to_string(), Value::Bool(table.has_column_header));
    body.insert("has_row_header".to_string(), Value::Bool(false));
    body.insert("children".to_string(), Value::Array(rows));
    wire_block("table", body)
}

fn code_block(code: &Code) -> Value {
    let mut body = Map::new();
    body.insert("rich_text".to_string(), Value::Array(plain_rich_text(&code.content)));
    body.insert(
        "language".to_string(),
        Value::from(notion_language(code.language.as_deref())),
    );
    wire_block("code", body)
}

fn quote_block(quote: &Quote, options: &WireOptions) -> Value {
    let (text, rest) = split_leading_text(&quote.children);
    wire_block(
        "quote",
        text_body(rich_text(text, options), children_to_notion(rest, options)),
    )
}

fn definition_item_block(item: &DefinitionListItem, options: &WireOptions) -> Value {
    let term: Vec<Run> = item
        .term
        .iter()
        .map(|run| match run {
            Run::Text(text) => Run::Text(TextRun {
                style: text.style.union(InlineStyle {
                    bold: true,
                    ..InlineStyle::PLAIN
                }),
                ..text.clone()
            }),
            other => other.clone(),
        })
        .collect();
    let definitions = item
        .definitions
        .iter()
        .map(|definition| paragraph_block(definition, &[], options))
        .collect();
    wire_block("paragraph", text_body(rich_text(&term, options), definitions))
}

fn footnote_block(footnote: &FootnoteDefinition, options: &WireOptions) -> Value {
    let (text, rest) = split_leading_text(&footnote.children);
    let reference = FootnoteReference {
        label: footnote.label.clone(),
        number: footnote.number,
    };
    let mut content = Vec::with_capacity(text.len() + 1);
    content.push(Run::plain(format!(
        "[{}] ",
        footnote_marker(&reference, options.footnote_markers)
    )));
    content.extend_from_slice(text);
    let content = Concatenate::concatenate_similar(content);
    paragraph_block(&content, rest, options)
}
