use crate::plugins::{BlockCursor, BlockMatch, InlineCursor, InlineMatch, Plugin, PluginContext};
use crate::syntax::concatenate::Concatenate;
use crate::syntax::tree::{FootnoteDefinition, FootnoteId, Inline, Node};
use crate::util::str_utils::{dedent, is_blank, leading_indent, split_lines_inclusive, strip_newline};
use fancy_regex::Regex;
use std::collections::HashSet;
use std::mem;
use std::sync::OnceLock;

const MAX_LABEL_LEN: usize = 999;

/// Footnotes:
///
/// ```markdown
/// Body text[^note].
///
/// [^note]: The footnote's content.
///     Indented lines continue it, even after a blank line.
/// ```
///
/// References become [`Inline::Footnote`] placeholders and definitions become [`Node::FootnoteDefinition`]s. At
/// finalize time, the definitions move into the context's footnote table (first one wins; later duplicates turn into
/// a literal paragraph of their source) and references to labels that were never defined turn back into plain
/// `[^label]` text.
pub struct FootnotePlugin;

fn definition_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^ {0,3}\[\^([^\]\[\s]+)\]:(?=[ \t]|$)").expect("internal error"))
}

fn reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\^([^\]\[\s]+)\]").expect("internal error"))
}

/// The label and end offset of the first capture group, if the pattern matches and the label is acceptable.
fn label_match<'a>(re: &Regex, text: &'a str) -> Option<(&'a str, usize)> {
    let captures = re.captures(text).ok()??;
    let whole = captures.get(0)?;
    let label = captures.get(1)?.as_str();
    (label.len() <= MAX_LABEL_LEN).then_some((label, whole.end()))
}

impl Plugin for FootnotePlugin {
    fn name(&self) -> &str {
        "footnotes"
    }

    fn match_block(&self, cursor: &BlockCursor<'_>, ctx: &mut PluginContext) -> Option<BlockMatch> {
        if cursor.in_list_item() && leading_indent(cursor.line()) > 0 {
            return None;
        }
        let (label, marker_end) = label_match(definition_start(), cursor.line())?;
        let rest = cursor.rest();

        let mut lines = split_lines_inclusive(rest);
        let first = lines.next()?;
        let mut body = String::with_capacity(first.len());
        body.push_str(strip_newline(&first[marker_end..]).trim_start());
        body.push('\n');
        let mut consumed = first.len();

        let mut pending_blanks = 0;
        let mut pending_len = 0;
        for line in lines {
            if is_blank(line) {
                pending_blanks += 1;
                pending_len += line.len();
                continue;
            }
            if leading_indent(line) == 0 {
                break;
            }
            for _ in 0..pending_blanks {
                body.push('\n');
            }
            consumed += pending_len + line.len();
            pending_blanks = 0;
            pending_len = 0;
            body.push_str(strip_newline(dedent(line, 4)));
            body.push('\n');
        }

        let source = strip_newline(&rest[..consumed]).to_string();
        let body = cursor.parse_blocks(&body, ctx);
        Some(BlockMatch {
            consumed,
            node: Node::FootnoteDefinition(FootnoteDefinition {
                id: FootnoteId::new(label),
                body,
                source: source.trim_end().to_string(),
            }),
        })
    }

    fn match_inline(&self, cursor: &InlineCursor<'_>, _ctx: &mut PluginContext) -> Option<InlineMatch> {
        let rest = cursor.rest();
        if !rest.starts_with("[^") {
            return None;
        }
        let (label, consumed) = label_match(reference(), rest)?;
        Some(InlineMatch {
            consumed,
            inlines: vec![Inline::Footnote(FootnoteId::new(label))],
        })
    }

    fn finalize(&self, roots: &mut Vec<Node>, ctx: &mut PluginContext) {
        *roots = collect_definitions(mem::take(roots), ctx);

        let defined: HashSet<String> = ctx.footnotes.labels().map(str::to_string).collect();
        let mut resolve = |inlines: &mut Vec<Inline>| resolve_references(inlines, &defined);
        for node in roots.iter_mut() {
            node.visit_inlines_mut(&mut resolve);
        }
        for body in ctx.footnotes.bodies_mut() {
            for node in body.iter_mut() {
                node.visit_inlines_mut(&mut resolve);
            }
        }
    }
}

/// Moves footnote definitions out of `nodes` (and out of the definitions' own bodies) into the footnote table.
fn collect_definitions(nodes: Vec<Node>, ctx: &mut PluginContext) -> Vec<Node> {
    let mut kept = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Node::FootnoteDefinition(FootnoteDefinition { id, body, source }) = node else {
            kept.push(node);
            continue;
        };
        if !ctx.footnotes.insert(id.label.as_str(), Vec::new()) {
            log::debug!("footnote {} is already defined; keeping the duplicate as text", id.as_source());
            kept.push(Node::literal_paragraph(source));
            continue;
        }
        // Reserve the slot first, so that definitions nested in this one come after it.
        let body = collect_definitions(body, ctx);
        if let Some(slot) = ctx.footnotes.get_mut(&id.label) {
            *slot = body;
        }
    }
    kept
}

fn resolve_references(inlines: &mut Vec<Inline>, defined: &HashSet<String>) {
    let mut changed = false;
    for inline in inlines.iter_mut() {
        if let Inline::Footnote(id) = inline {
            if !defined.contains(&id.label) {
                log::debug!("footnote {} has no definition; keeping it as text", id.as_source());
                *inline = Inline::plain(id.as_source());
                changed = true;
            }
        }
    }
    if changed {
        *inlines = Concatenate::concatenate_similar(mem::take(inlines));
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
    use std::sync::Arc;

    fn parse(md: &str) -> SyntaxDoc {
        init_logger();
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(FootnotePlugin));
        MarkdownParser::new(registry).parse(md)
    }

    fn footnotes(doc: &SyntaxDoc) -> Vec<(&str, &Vec<Node>)> {
        doc.ctx.footnotes.iter().collect()
    }

    #[test]
    fn reference_and_definition() {
        let doc = parse(indoc! {r"
            Cool story[^a]!

            [^a]: My footnote
              with two lines."});
        assert_eq!(doc.roots, vec![paragraph!["Cool story", footnote["a"], "!"]]);
        assert_eq!(
            footnotes(&doc),
            vec![("a", &vec![paragraph!["My footnote\nwith two lines."]])]
        );
    }

    #[test]
    fn definition_with_block_content() {
        let doc = parse(indoc! {r"
            Text[^1].

            [^1]: - a list
                - in a footnote

                And a second paragraph.
            "});
        assert_eq!(doc.roots, vec![paragraph!["Text", footnote["1"], "."]]);
        let body = doc.ctx.footnotes.get("1").unwrap();
        assert_eq!(body.len(), 2);
        unwrap!(&body[0], Node::List(list));
        assert_eq!(list.items.len(), 2);
        assert_eq!(body[1], paragraph!["And a second paragraph."]);
    }

    #[test]
    fn unindented_line_ends_definition() {
        let doc = parse(indoc! {r"
            [^a]: note

            Back in the body[^a].
            "});
        assert_eq!(doc.roots, vec![paragraph!["Back in the body", footnote["a"], "."]]);
        assert_eq!(footnotes(&doc), vec![("a", &vec![paragraph!["note"]])]);
    }

    #[test]
    fn consecutive_definitions() {
        let doc = parse(indoc! {r"
            [^b]: second
            [^a]: first
            "});
        assert_eq!(doc.roots, Vec::new());
        assert_eq!(doc.ctx.footnotes.labels().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn missing_definition_is_literal() {
        let doc = parse("Text with [^missing] ref.");
        assert_eq!(doc.roots, vec![paragraph!["Text with [^missing] ref."]]);
        assert!(doc.ctx.footnotes.is_empty());
    }

    #[test]
    fn duplicate_definition_is_literal() {
        let doc = parse(indoc! {r"
            Ref[^a].

            [^a]: first

            [^a]: second
            "});
        assert_eq!(
            doc.roots,
            vec![paragraph!["Ref", footnote["a"], "."], paragraph!["[^a]: second"]]
        );
        assert_eq!(footnotes(&doc), vec![("a", &vec![paragraph!["first"]])]);
    }

    #[test]
    fn references_in_footnote_bodies_resolve() {
        let doc = parse(indoc! {r"
            Body text[^1][^2].

            [^1]: a footnote that references itself[^1].
            [^2]: a footnote that mentions [^nothing].
            "});
        assert_eq!(doc.roots, vec![paragraph!["Body text", footnote["1"], footnote["2"], "."]]);
        assert_eq!(
            footnotes(&doc),
            vec![
                ("1", &vec![paragraph!["a footnote that references itself", footnote["1"], "."]]),
                ("2", &vec![paragraph!["a footnote that mentions [^nothing]."]]),
            ]
        );
    }

    #[test]
    fn references_in_nested_inlines() {
        let doc = parse(indoc! {r"
            *see[^x]* and [link[^x]](https://example.com)

            | h[^x] |
            |-------|
            | c     |

            [^x]: x
            "});
        assert_eq!(
            doc.roots[0],
            paragraph![
                em["see", footnote["x"]],
                " and ",
                link["link", footnote["x"]]("https://example.com")
            ]
        );
        unwrap!(&doc.roots[1], Node::Table(table));
        assert_eq!(table.rows[0][0], inlines!["h", footnote["x"]]);
    }

    #[test]
    fn code_spans_are_not_scanned() {
        let doc = parse("`[^a]`\n\n[^a]: defined\n");
        assert_eq!(doc.roots, vec![paragraph![code["[^a]"]]]);
    }

    #[test]
    fn definitions_inside_fences_are_code() {
        let doc = parse(indoc! {r"
            ```
            [^a]: not a footnote
            ```
            "});
        unwrap!(get_only(doc.roots), Node::CodeBlock(code));
        assert_eq!(code.value, "[^a]: not a footnote");
        assert!(doc.ctx.footnotes.is_empty());
    }

    #[test]
    fn indented_four_is_code() {
        let doc = parse("    [^a]: code\n");
        unwrap!(get_only(doc.roots), Node::CodeBlock(_));
    }

    #[test]
    fn quoted_definition_stays_text() {
        let doc = parse("Text[^a].\n\n> [^a]: Explanation.\n");
        assert!(doc.ctx.footnotes.is_empty());
        assert_eq!(
            doc.roots,
            vec![
                paragraph!["Text[^a]."],
                Node::BlockQuote(BlockQuote {
                    body: vec![paragraph!["[^a]: Explanation."]],
                }),
            ]
        );
    }

    #[test]
    fn indented_definition_in_list_item_stays_in_the_item() {
        let doc = parse("- one[^n]\n  [^n]: note\n- two\n");
        assert!(doc.ctx.footnotes.is_empty());
        unwrap!(get_only(doc.roots), Node::List(list));
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].item, vec![paragraph!["one[^n]\n[^n]: note"]]);
        assert_eq!(list.items[1].item, vec![paragraph!["two"]]);
    }

    #[test]
    fn indented_definition_outside_lists() {
        let doc = parse(indoc! {r"
            - item

            Text[^a].

              [^a]: note
            "});
        assert_eq!(doc.roots.len(), 2);
        unwrap!(&doc.roots[0], Node::List(_));
        assert_eq!(doc.roots[1], paragraph!["Text", footnote["a"], "."]);
        assert_eq!(footnotes(&doc), vec![("a", &vec![paragraph!["note"]])]);
    }

    #[test]
    fn labels_must_not_contain_spaces() {
        let doc = parse("[^a b]: not a definition\n");
        assert!(doc.ctx.footnotes.is_empty());
        assert_eq!(doc.roots, vec![paragraph!["[^a b]: not a definition"]]);
    }

    #[test]
    fn nested_definition_comes_after_its_parent() {
        let doc = parse(indoc! {r"
            [^outer]: outer
                [^inner]: inner
            "});
        assert_eq!(doc.ctx.footnotes.labels().collect::<Vec<_>>(), vec!["outer", "inner"]);
        assert_eq!(doc.ctx.footnotes.get("outer"), Some(&vec![paragraph!["outer"]]));
    }

    #[test]
    fn definition_source() {
        let parser = MarkdownParser::new(PluginRegistry::new());
        let cursor = BlockCursor {
            text: "[^a]: one\n  two\n\nafter\n",
            pos: 0,
            at_block_start: true,
            in_list_item: false,
            parser: &parser,
        };
        let mut ctx = PluginContext::default();
        let claim = FootnotePlugin.match_block(&cursor, &mut ctx).unwrap();
        assert_eq!(claim.consumed, "[^a]: one\n  two\n".len());
        unwrap!(claim.node, Node::FootnoteDefinition(def));
        assert_eq!(def.source, "[^a]: one\n  two");
        assert_eq!(def.id, FootnoteId::new("a"));
    }
}
