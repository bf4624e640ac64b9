use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::block::{Span, SpanKind};

/// Strip `**strong**` and `*emphasis*` markup from a single line of text.
///
/// Returns the visible text together with Bold/Italic spans, or `None` when
/// the line has no emphasis or would parse as anything other than one plain
/// paragraph (list markers, block quotes, links, code spans, html). Entities
/// and backslash escapes also return `None`, since only the emphasis markers
/// may be removed from the line. Callers keep the text verbatim in that case.
pub fn strip_emphasis(text: &str) -> Option<(String, Vec<Span>)> {
    if !text.contains(['*', '_']) {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<(SpanKind, usize)> = Vec::new();
    let mut spans = Vec::new();
    let mut paragraphs = 0;
    // end of the last text event, in source bytes
    let mut consumed = 0;

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Paragraph) => paragraphs += 1,
            Event::End(TagEnd::Paragraph) => {}
            Event::Start(Tag::Strong) => open.push((SpanKind::Bold, out.len())),
            Event::Start(Tag::Emphasis) => open.push((SpanKind::Italic, out.len())),
            Event::End(TagEnd::Strong) | Event::End(TagEnd::Emphasis) => {
                if let Some((kind, start)) = open.pop() {
                    if start < out.len() {
                        spans.push(Span::new(kind, start, out.len()));
                    }
                }
            }
            Event::Text(t) => {
                let source = text.get(range.clone())?;
                if source != &*t || !only_markers(text.get(consumed..range.start)?) {
                    return None;
                }
                consumed = range.end;
                out.push_str(&t);
            }
            _ => return None,
        }
    }

    if paragraphs != 1 || spans.is_empty() || !text.get(consumed..).is_some_and(only_markers) {
        return None;
    }
    spans.sort_by_key(|span| span.start);
    Some((out, spans))
}

fn only_markers(gap: &str) -> bool {
    gap.chars().all(|c| c == '*' || c == '_')
}
