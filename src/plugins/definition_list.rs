use crate::plugins::{BlockCursor, BlockMatch, Plugin, PluginContext};
use crate::syntax::tree::{DefinitionItem, DefinitionList, Node};
use crate::util::str_utils::{dedent, is_blank, leading_indent, split_lines_inclusive, strip_newline};
use fancy_regex::Regex;
use std::sync::OnceLock;

/// Definition lists:
///
/// ```markdown
/// Term
/// : The definition.
///   Lines indented by two or more continue it.
/// : A second definition.
///
/// Another term
/// : Its definition.
/// ```
///
/// A list only starts at a block boundary, so a `: ` line can't interrupt a paragraph. Items may be separated by at
/// most one blank line.
pub struct DefinitionListPlugin;

fn definition_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}:[ \t]+(?=\S)").expect("internal error"))
}

/// Lines that open some other block, and so can't be a term.
fn other_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:#{1,6}(?:\s|$)|>|\||<|:|[-*+](?:\s|$)|\d{1,9}[.)](?:\s|$)|`{3}|~{3}|\[\^|(?:[-*_][ \t]*){3,}$)")
            .expect("internal error")
    })
}

struct RawItem<'a> {
    term: &'a str,
    definitions: Vec<String>,
}

/// Reads as many items as possible from the start of `text`. Returns them and the number of bytes they span.
fn scan(text: &str) -> (Vec<RawItem<'_>>, usize) {
    let mut items = Vec::new();
    let mut pos = 0;
    loop {
        let mut lines = split_lines_inclusive(&text[pos..]);
        let mut local = 0;
        let mut line = lines.next();
        if !items.is_empty() {
            if let Some(blank) = line.filter(|l| is_blank(l)) {
                local += blank.len();
                line = lines.next();
            }
        }
        let Some(term) = line else {
            break;
        };
        if is_blank(term)
            || leading_indent(term) >= 4
            || other_block().is_match(strip_newline(term).trim_start()).unwrap_or(true)
        {
            break;
        }
        local += term.len();

        let mut definitions = Vec::new();
        let mut current: Option<String> = None;
        for line in lines {
            let content = strip_newline(line);
            if let Ok(Some(marker)) = definition_marker().find(content) {
                definitions.extend(current.take());
                current = Some(content[marker.end()..].to_string());
            } else if let Some(definition) = current.as_mut().filter(|_| !is_blank(line) && leading_indent(line) >= 2) {
                definition.push('\n');
                definition.push_str(dedent(content, 4));
            } else {
                break;
            }
            local += line.len();
        }
        definitions.extend(current);
        if definitions.is_empty() {
            break;
        }
        items.push(RawItem {
            term: strip_newline(term).trim(),
            definitions,
        });
        pos += local;
    }
    (items, pos)
}

impl Plugin for DefinitionListPlugin {
    fn name(&self) -> &str {
        "definition_list"
    }

    fn match_block(&self, cursor: &BlockCursor<'_>, ctx: &mut PluginContext) -> Option<BlockMatch> {
        if !cursor.at_block_start() || (cursor.in_list_item() && leading_indent(cursor.line()) > 0) {
            return None;
        }
        let (raw_items, consumed) = scan(cursor.rest());
        if raw_items.is_empty() {
            return None;
        }
        let mut items = Vec::with_capacity(raw_items.len());
        for raw in raw_items {
            let term = cursor.parse_inlines(raw.term, ctx);
            let definitions = raw
                .definitions
                .iter()
                .map(|definition| cursor.parse_inlines(definition, ctx))
                .collect();
            items.push(DefinitionItem { term, definitions });
        }
        Some(BlockMatch {
            consumed,
            node: Node::DefinitionList(DefinitionList { items }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginRegistry;
    use crate::syntax::parser::MarkdownParser;
    use crate::syntax::tree::*;
    use crate::syntax::tree_test_utils::*;
    use crate::util::utils_for_test::*;
    use indoc::indoc;

    fn parse(md: &str) -> Vec<Node> {
        MarkdownParser::new(PluginRegistry::with_defaults()).parse(md).roots
    }

    #[test]
    fn single_item() {
        let roots = parse("Apple\n: A fruit.\n");
        assert_eq!(
            roots,
            vec![Node::DefinitionList(DefinitionList {
                items: vec![DefinitionItem {
                    term: inlines!["Apple"],
                    definitions: vec![inlines!["A fruit."]],
                }]
            })]
        );
    }

    #[test]
    fn several_items_and_definitions() {
        let roots = parse(indoc! {r"
            Intro paragraph.

            **Apple**
            : A fruit.
            : A company.

            Rust
            : A language
              with continuation.

            Outro.
            "});
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0], paragraph!["Intro paragraph."]);
        unwrap!(&roots[1], Node::DefinitionList(list));
        assert_eq!(
            list.items,
            vec![
                DefinitionItem {
                    term: inlines![strong["Apple"]],
                    definitions: vec![inlines!["A fruit."], inlines!["A company."]],
                },
                DefinitionItem {
                    term: inlines!["Rust"],
                    definitions: vec![inlines!["A language\nwith continuation."]],
                },
            ]
        );
        assert_eq!(roots[2], paragraph!["Outro."]);
    }

    #[test]
    fn does_not_interrupt_paragraph() {
        let roots = parse("Line one\nLine two\n: not a definition\n");
        assert_eq!(roots, vec![paragraph!["Line one\nLine two\n: not a definition"]]);
    }

    #[test]
    fn needs_a_definition() {
        let roots = parse("Just a term\n\n: orphan\n");
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0], paragraph!["Just a term"]);
    }

    #[test]
    fn other_blocks_are_not_terms() {
        for md in ["# Heading\n: x\n", "- item\n: x\n", "> quote\n: x\n", "1. item\n: x\n", "---\n: x\n"] {
            let roots = parse(md);
            assert!(
                !roots.iter().any(|node| matches!(node, Node::DefinitionList(_))),
                "{md:?} parsed as {roots:?}"
            );
        }
    }

    #[test]
    fn thematic_break_is_not_a_term() {
        for md in ["***\n: x\n", "___\n: x\n", "- - -\r\n: x\r\n"] {
            let roots = parse(md);
            assert_eq!(roots.first(), Some(&Node::ThematicBreak), "{md:?} parsed as {roots:?}");
            assert!(!roots.iter().any(|node| matches!(node, Node::DefinitionList(_))));
        }
    }

    #[test]
    fn indented_term_in_list_item_stays_in_the_item() {
        let roots = parse("- item\n\n  Term\n  : definition\n- next\n");
        unwrap!(get_only(roots), Node::List(list));
        assert_eq!(list.items.len(), 2);
        assert!(!list.items[0].item.iter().any(|node| matches!(node, Node::DefinitionList(_))));
    }

    #[test]
    fn footnote_references_in_definitions() {
        let doc = MarkdownParser::default().parse(indoc! {r"
            Term[^t]
            : Definition[^d]

            [^t]: term note
            [^d]: definition note
            "});
        unwrap!(get_only(doc.roots), Node::DefinitionList(list));
        assert_eq!(
            list.items,
            vec![DefinitionItem {
                term: inlines!["Term", footnote["t"]],
                definitions: vec![inlines!["Definition", footnote["d"]]],
            }]
        );
        assert_eq!(doc.ctx.footnotes.len(), 2);
    }

    #[test]
    fn scan_stops_at_second_blank() {
        let (items, consumed) = scan("A\n: a\n\n\nB\n: b\n");
        assert_eq!(items.len(), 1);
        assert_eq!(consumed, "A\n: a\n".len());
    }
}
