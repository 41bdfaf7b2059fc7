use crate::blocks::{FootnoteReference, InlineStyle, Run, TextRun};
use crate::render::RenderState;
use crate::syntax::concatenate::Concatenate;
use crate::syntax::tree::{Image, Inline, Link, Span, SpanVariant, Text, TextVariant};

impl RenderState<'_> {
    /// Flattens nested inline content into runs. Each run carries the union of the styles around it and the innermost
    /// link; neighboring runs that end up looking the same are merged.
    pub(crate) fn runs(&mut self, inlines: &[Inline]) -> Vec<Run> {
        let mut out = Vec::with_capacity(inlines.len());
        self.flatten(inlines, InlineStyle::PLAIN, None, &mut out);
        Concatenate::concatenate_similar(out)
    }

    fn flatten(&mut self, inlines: &[Inline], style: InlineStyle, link: Option<&str>, out: &mut Vec<Run>) {
        for inline in inlines {
            match inline {
                Inline::Text(Text { variant, value }) => {
                    let style = match variant {
                        TextVariant::Plain | TextVariant::InlineHtml => style,
                        TextVariant::Code | TextVariant::Math => style.union(InlineStyle {
                            code: true,
                            ..InlineStyle::PLAIN
                        }),
                    };
                    push_text(out, value, style, link);
                }
                Inline::Span(Span { variant, children }) => {
                    let added = match variant {
                        SpanVariant::Strong => InlineStyle {
                            bold: true,
                            ..InlineStyle::PLAIN
                        },
                        SpanVariant::Emphasis => InlineStyle {
                            italic: true,
                            ..InlineStyle::PLAIN
                        },
                        SpanVariant::Delete => InlineStyle {
                            strikethrough: true,
                            ..InlineStyle::PLAIN
                        },
                    };
                    self.flatten(children, style.union(added), link, out);
                }
                Inline::Link(Link { display, url, .. }) => self.flatten(display, style, Some(url.as_str()), out),
                Inline::Image(Image { alt, url, .. }) => {
                    let text = if alt.is_empty() { url } else { alt };
                    push_text(out, text, style, Some(url.as_str()));
                }
                Inline::Footnote(id) => {
                    if self.footnotes.contains(&id.label) {
                        out.push(Run::FootnoteReference(FootnoteReference {
                            label: id.label.clone(),
                            number: self.numbering.number_for(&id.label),
                        }));
                    } else {
                        push_text(out, &id.as_source(), style, link);
                    }
                }
            }
        }
    }
}

fn push_text(out: &mut Vec<Run>, content: &str, style: InlineStyle, link: Option<&str>) {
    if content.is_empty() {
        return;
    }
    out.push(Run::Text(TextRun {
        content: content.to_string(),
        style,
        link: link.map(str::to_string),
    }));
}
