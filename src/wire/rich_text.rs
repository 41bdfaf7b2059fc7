use crate::blocks::{FootnoteReference, InlineStyle, Run, TextRun};
use crate::wire::{FootnoteMarkers, WireOptions};
use serde_json::{json, Map, Value};

/// The most characters a single rich text object's `content` may hold.
pub const MAX_TEXT_LEN: usize = 2000;

/// Converts runs into rich text objects, splitting any that are too long.
pub fn rich_text(runs: &[Run], options: &WireOptions) -> Vec<Value> {
    let mut result = Vec::with_capacity(runs.len());
    for run in runs {
        match run {
            Run::Text(TextRun { content, style, link }) => {
                for chunk in split_content(content, MAX_TEXT_LEN) {
                    result.push(text_object(chunk, *style, link.as_deref()));
                }
            }
            Run::FootnoteReference(reference) => {
                let marker = footnote_marker(reference, options.footnote_markers);
                result.push(text_object(&format!("[{marker}]"), InlineStyle::PLAIN, None));
            }
        }
    }
    result
}

/// Rich text for a code block's content: one unstyled text object per chunk.
pub fn plain_rich_text(content: &str) -> Vec<Value> {
    split_content(content, MAX_TEXT_LEN)
        .map(|chunk| text_object(chunk, InlineStyle::PLAIN, None))
        .collect()
}

pub fn footnote_marker(reference: &FootnoteReference, markers: FootnoteMarkers) -> String {
    match markers {
        FootnoteMarkers::Numbers => reference.number.to_string(),
        FootnoteMarkers::Labels => reference.label.clone(),
    }
}

fn text_object(content: &str, style: InlineStyle, link: Option<&str>) -> Value {
    let mut text = Map::new();
    text.insert("content".to_string(), Value::from(content));
    if let Some(url) = link {
        text.insert("link".to_string(), json!({ "url": url }));
    }

    let mut object = Map::new();
    object.insert("type".to_string(), Value::from("text"));
    object.insert("text".to_string(), Value::Object(text));
    if let Some(annotations) = annotations(style) {
        object.insert("annotations".to_string(), annotations);
    }
    Value::Object(object)
}

/// Only the flags that are set; `None` for unstyled text.
fn annotations(style: InlineStyle) -> Option<Value> {
    let InlineStyle {
        bold,
        italic,
        strikethrough,
        code,
    } = style;
    let mut result = Map::new();
    for (name, set) in [("bold", bold), ("italic", italic), ("strikethrough", strikethrough), ("code", code)] {
        if set {
            result.insert(name.to_string(), Value::Bool(true));
        }
    }
    (!result.is_empty()).then_some(Value::Object(result))
}

/// Splits `content` into pieces of at most `max_chars` characters. Empty content yields nothing.
fn split_content(content: &str, max_chars: usize) -> impl Iterator<Item = &str> {
    let mut remaining = content;
    std::iter::from_fn(move || {
        if remaining.is_empty() {
            return None;
        }
        let end = remaining.char_indices().nth(max_chars).map_or(remaining.len(), |(idx, _)| idx);
        let (chunk, rest) = remaining.split_at(end);
        remaining = rest;
        Some(chunk)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(content: &str, style: InlineStyle, link: Option<&str>) -> Run {
        Run::Text(TextRun {
            content: content.to_string(),
            style,
            link: link.map(str::to_string),
        })
    }

    #[test]
    fn plain_text_has_no_annotations_or_link() {
        assert_eq!(
            rich_text(&[Run::plain("hello")], &WireOptions::default()),
            vec![json!({"type": "text", "text": {"content": "hello"}})]
        );
    }

    #[test]
    fn only_set_flags_are_emitted() {
        let style = InlineStyle {
            bold: true,
            code: true,
            ..InlineStyle::PLAIN
        };
        assert_eq!(
            rich_text(&[styled("x", style, Some("https://example.com"))], &WireOptions::default()),
            vec![json!({
                "type": "text",
                "text": {"content": "x", "link": {"url": "https://example.com"}},
                "annotations": {"bold": true, "code": true},
            })]
        );
    }

    #[test]
    fn footnote_markers() {
        let reference = Run::FootnoteReference(FootnoteReference {
            label: "note".to_string(),
            number: 3,
        });
        assert_eq!(
            rich_text(std::slice::from_ref(&reference), &WireOptions::default()),
            vec![json!({"type": "text", "text": {"content": "[3]"}})]
        );
        let by_label = WireOptions {
            footnote_markers: FootnoteMarkers::Labels,
        };
        assert_eq!(
            rich_text(&[reference], &by_label),
            vec![json!({"type": "text", "text": {"content": "[note]"}})]
        );
    }

    #[test]
    fn long_content_is_split() {
        let long = "é".repeat(MAX_TEXT_LEN * 2 + 5);
        let style = InlineStyle {
            italic: true,
            ..InlineStyle::PLAIN
        };
        let objects = rich_text(&[styled(&long, style, None)], &WireOptions::default());
        assert_eq!(objects.len(), 3);
        let lens: Vec<usize> = objects
            .iter()
            .map(|o| o["text"]["content"].as_str().unwrap().chars().count())
            .collect();
        assert_eq!(lens, vec![MAX_TEXT_LEN, MAX_TEXT_LEN, 5]);
        assert!(objects.iter().all(|o| o["annotations"] == json!({"italic": true})));
    }

    #[test]
    fn split_edges() {
        assert_eq!(split_content("", 3).count(), 0);
        assert_eq!(split_content("abc", 3).collect::<Vec<_>>(), vec!["abc"]);
        assert_eq!(split_content("abcd", 3).collect::<Vec<_>>(), vec!["abc", "d"]);
    }
}
