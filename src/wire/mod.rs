//! Converts [Block]s into the JSON block objects of the Notion API.
//!
//! Each block kind has its own mapping function, and each one only inserts the fields that are present; nothing here
//! serializes a struct wholesale.
//!
//! ```
//! use mdnotion::markdown_to_blocks;
//! use mdnotion::wire::{to_notion_blocks, WireOptions};
//! use serde_json::json;
//!
//! let blocks = markdown_to_blocks("Hello, **world**!");
//! assert_eq!(
//!     to_notion_blocks(&blocks, &WireOptions::default()),
//!     vec![json!({
//!         "object": "block",
//!         "type": "paragraph",
//!         "paragraph": {
//!             "rich_text": [
//!                 {"type": "text", "text": {"content": "Hello, "}},
//!                 {"type": "text", "text": {"content": "world"}, "annotations": {"bold": true}},
//!                 {"type": "text", "text": {"content": "!"}},
//!             ],
//!         },
//!     })]
//! );
//! ```
mod language;
mod notion;
mod rich_text;

use crate::blocks::Block;
use serde_json::{Map, Value};

pub use language::notion_language;
pub use notion::block_to_notion;
pub use rich_text::{rich_text, MAX_TEXT_LEN};

/// The most blocks a single append request may carry.
pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WireOptions {
    pub footnote_markers: FootnoteMarkers,
}

/// How footnote references and definitions are marked in the text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FootnoteMarkers {
    /// `[1]`, `[2]`, ... in order of first reference.
    #[default]
    Numbers,
    /// The label as written in the source, like `[note]`.
    Labels,
}

pub fn to_notion_blocks(blocks: &[Block], options: &WireOptions) -> Vec<Value> {
    blocks.iter().flat_map(|block| block_to_notion(block, options)).collect()
}

/// Groups wire blocks into append-children request bodies, `{"children": [...]}`, of at most `batch_size` blocks each.
/// `batch_size` is clamped to `1..=100`.
pub fn append_requests(blocks: Vec<Value>, batch_size: usize) -> Vec<Value> {
    let batch_size = batch_size.clamp(1, DEFAULT_BATCH_SIZE);
    let mut requests = Vec::with_capacity(blocks.len().div_ceil(batch_size));
    let mut blocks = blocks.into_iter().peekable();
    while blocks.peek().is_some() {
        let children: Vec<Value> = blocks.by_ref().take(batch_size).collect();
        let mut request = Map::new();
        request.insert("children".to_string(), Value::Array(children));
        requests.push(Value::Object(request));
    }
    requests
}
