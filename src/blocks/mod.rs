//! The typed output of the pipeline.
//!
//! Every [Block] owns its children; the only reference between blocks is a footnote's label and number, which
//! [FootnoteReference] runs and [FootnoteDefinition] blocks share.
//!
//! Blocks serialize (with serde) to a tagged JSON form, which is what `--output blocks` prints:
//!
//! ```
//! use mdnotion::blocks::*;
//!
//! let block = Block::Paragraph(Paragraph {
//!     content: vec![Run::Text(TextRun {
//!         content: "hi".to_string(),
//!         style: InlineStyle { bold: true, ..Default::default() },
//!         link: None,
//!     })],
//! });
//! assert_eq!(
//!     serde_json::to_string(&block).unwrap(),
//!     r#"{"type":"paragraph","content":[{"type":"text","content":"hi","style":{"bold":true,"italic":false,"strikethrough":false,"code":false}}]}"#,
//! );
//! ```
use crate::syntax::concatenate::Concatenate;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Heading(Heading),
    List(List),
    Table(Table),
    Code(Code),
    Quote(Quote),
    Divider,
    DefinitionList(DefinitionList),
    FootnoteDefinition(FootnoteDefinition),
}

/// Every kind of block, including the ones that only appear nested within another block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    ListItem,
    TaskListItem,
    Table,
    TableRow,
    Code,
    Quote,
    Divider,
    DefinitionList,
    DefinitionListItem,
    FootnoteDefinition,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub content: Vec<Run>,
}

/// A heading. `level` is the Markdown heading depth, 1 through 6.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub content: Vec<Run>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    pub items: Vec<ListItem>,
}

/// A list item. Task items (`- [ ]`, `- [x]`) have `checked` set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    pub children: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Table {
    pub alignments: Vec<Alignment>,
    pub has_column_header: bool,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<Vec<Run>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Code {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub children: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefinitionList {
    pub items: Vec<DefinitionListItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefinitionListItem {
    pub term: Vec<Run>,
    pub definitions: Vec<Vec<Run>>,
}

/// A footnote's content, emitted after the document body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FootnoteDefinition {
    pub label: String,
    pub number: usize,
    pub children: Vec<Block>,
}

/// A flattened piece of inline content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Run {
    Text(TextRun),
    FootnoteReference(FootnoteReference),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub content: String,
    #[serde(skip_serializing_if = "InlineStyle::is_plain")]
    pub style: InlineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FootnoteReference {
    pub label: String,
    pub number: usize,
}

/// Styling flags. Nested styles combine by union, so the order they were applied in doesn't matter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
}

impl InlineStyle {
    pub const PLAIN: InlineStyle = InlineStyle {
        bold: false,
        italic: false,
        strikethrough: false,
        code: false,
    };

    pub fn union(self, other: InlineStyle) -> InlineStyle {
        InlineStyle {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            strikethrough: self.strikethrough || other.strikethrough,
            code: self.code || other.code,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

impl Block {
    /// A paragraph with `text` as its only, unstyled run.
    pub fn literal(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph {
            content: vec![Run::plain(text)],
        })
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::Heading(_) => BlockKind::Heading,
            Block::List(_) => BlockKind::List,
            Block::Table(_) => BlockKind::Table,
            Block::Code(_) => BlockKind::Code,
            Block::Quote(_) => BlockKind::Quote,
            Block::Divider => BlockKind::Divider,
            Block::DefinitionList(_) => BlockKind::DefinitionList,
            Block::FootnoteDefinition(_) => BlockKind::FootnoteDefinition,
        }
    }
}

impl ListItem {
    pub fn kind(&self) -> BlockKind {
        match self.checked {
            Some(_) => BlockKind::TaskListItem,
            None => BlockKind::ListItem,
        }
    }
}

impl Table {
    /// The number of columns: the widest of the alignment row and all rows.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.len())
            .chain(std::iter::once(self.alignments.len()))
            .max()
            .unwrap_or(0)
    }

    pub fn header_rows(&self) -> &[TableRow] {
        match (self.has_column_header, self.rows.split_first()) {
            (true, Some(_)) => &self.rows[..1],
            _ => &[],
        }
    }

    pub fn data_rows(&self) -> &[TableRow] {
        &self.rows[self.header_rows().len()..]
    }
}

impl Run {
    pub fn plain(content: impl Into<String>) -> Self {
        Run::Text(TextRun {
            content: content.into(),
            style: InlineStyle::PLAIN,
            link: None,
        })
    }
}

impl Concatenate for Run {
    fn try_concatenate(&mut self, other: Self) -> Result<(), Self> {
        match (self, other) {
            (Run::Text(me), Run::Text(other)) if me.style == other.style && me.link == other.link => {
                me.content.push_str(&other.content);
                Ok(())
            }
            (_, other) => Err(other),
        }
    }
}
