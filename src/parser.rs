use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::{Block, BlockKind, HeadingLevel, Span, SpanKind};
use crate::inline;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").expect("heading regex"));
static CHECKBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+\[([ xX])\](?:\s+(.*))?$").expect("checkbox regex"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*](?:\s+(.*))?$").expect("bullet regex"));
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+").expect("mention regex"));

pub const DEFAULT_TITLE: &str = "Untitled Document";
pub const DEFAULT_INDENT_UNIT: usize = 2;
pub const DEFAULT_FOOTER_PREFIXES: [&str; 2] = ["Meeting recorded by:", "Duration:"];

/// Decides which paragraph lines are styled as footer text
#[derive(Debug, Clone)]
pub enum FooterRule {
    None,
    /// Paragraphs starting with any of these markers
    Prefixes(Vec<String>),
    /// Paragraphs matching this pattern anywhere
    Pattern(Regex),
    /// The last paragraph of the document
    LastParagraph,
}

impl FooterRule {
    fn matches_line(&self, text: &str) -> bool {
        match self {
            FooterRule::Prefixes(prefixes) => prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && text.starts_with(prefix.as_str())),
            FooterRule::Pattern(re) => re.is_match(text),
            FooterRule::None | FooterRule::LastParagraph => false,
        }
    }
}

impl Default for FooterRule {
    fn default() -> Self {
        FooterRule::Prefixes(DEFAULT_FOOTER_PREFIXES.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Columns of indentation per list nesting level. Must be non-zero.
    pub indent_unit: usize,
    pub title_fallback: String,
    pub footer: FooterRule,
    /// Strip `**bold**` / `*italic*` markup into spans
    pub inline_markup: bool,
    /// Treat `---` style thematic breaks as blank separators
    pub rules_as_separators: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT,
            title_fallback: DEFAULT_TITLE.to_string(),
            footer: FooterRule::default(),
            inline_markup: false,
            rules_as_separators: true,
        }
    }
}

/// Result of parsing a markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Parse markdown text into a title and an ordered list of blocks.
///
/// Never fails: anything that is not a heading, list item, blank line or
/// thematic break becomes a paragraph.
pub fn parse(markdown: &str, options: &ParseOptions) -> Parsed {
    let indent_unit = options.indent_unit.max(1);
    let mut blocks: Vec<Block> = Vec::new();

    for line in markdown.lines() {
        let block = parse_line(line, indent_unit, options);
        if block.is_blank() && blocks.last().is_some_and(Block::is_blank) {
            continue;
        }
        blocks.push(block);
    }

    for block in blocks.iter_mut().filter(|b| !b.is_blank()) {
        add_mentions(block);
        if block.kind == BlockKind::Paragraph && options.footer.matches_line(&block.text) {
            add_footer(block);
        }
    }

    if let FooterRule::LastParagraph = options.footer {
        if let Some(block) = blocks
            .iter_mut()
            .rev()
            .find(|b| b.kind == BlockKind::Paragraph)
        {
            add_footer(block);
        }
    }

    for block in &mut blocks {
        block.spans.sort_by_key(|span| (span.start, span.kind));
    }

    let title = extract_title(&blocks).unwrap_or_else(|| options.title_fallback.clone());
    debug!(blocks = blocks.len(), %title, "parsed markdown");

    Parsed { title, blocks }
}

fn parse_line(line: &str, indent_unit: usize, options: &ParseOptions) -> Block {
    let trimmed = line.trim();

    if trimmed.is_empty() || (options.rules_as_separators && is_thematic_break(trimmed)) {
        return Block::blank();
    }

    if let Some(caps) = HEADING_RE.captures(trimmed) {
        if let Some(level) = HeadingLevel::from_marker_len(caps[1].len()) {
            return text_block(BlockKind::Heading(level), caps[2].trim(), options);
        }
    }

    let (columns, rest) = split_indent(line, indent_unit);
    let depth = columns / indent_unit;

    if let Some(caps) = CHECKBOX_RE.captures(rest) {
        let checked = !caps[1].trim().is_empty();
        let text = caps.get(2).map_or("", |m| m.as_str().trim());
        return text_block(BlockKind::Checkbox { checked }, text, options).with_depth(depth);
    }

    if let Some(caps) = BULLET_RE.captures(rest) {
        let text = caps.get(1).map_or("", |m| m.as_str().trim());
        return text_block(BlockKind::Bullet, text, options).with_depth(depth);
    }

    text_block(BlockKind::Paragraph, trimmed, options)
}

fn text_block(kind: BlockKind, text: &str, options: &ParseOptions) -> Block {
    if options.inline_markup {
        if let Some((stripped, spans)) = inline::strip_emphasis(text) {
            let mut block = Block::new(kind, stripped);
            block.spans = spans;
            return block;
        }
    }
    Block::new(kind, text)
}

/// Count leading indentation in columns and return the remainder of the line.
/// A tab counts as one full indent unit.
fn split_indent(line: &str, indent_unit: usize) -> (usize, &str) {
    let mut columns = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            ' ' => columns += 1,
            '\t' => columns += indent_unit,
            _ => return (columns, &line[idx..]),
        }
    }
    (columns, "")
}

fn is_thematic_break(trimmed: &str) -> bool {
    let mut marks = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for ch in marks {
        if ch != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

fn add_mentions(block: &mut Block) {
    let mentions: Vec<Span> = MENTION_RE
        .find_iter(&block.text)
        .map(|m| Span::new(SpanKind::Mention, m.start(), m.end()))
        .collect();
    block.spans.extend(mentions);
}

fn add_footer(block: &mut Block) {
    if block.text.is_empty() || block.spans_of(SpanKind::Footer).next().is_some() {
        return;
    }
    let end = block.text.len();
    block.spans.push(Span::new(SpanKind::Footer, 0, end));
}

fn extract_title(blocks: &[Block]) -> Option<String> {
    blocks
        .iter()
        .find(|b| b.kind == BlockKind::Heading(HeadingLevel::H1) && !b.text.is_empty())
        .map(|b| b.text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse_default(markdown: &str) -> Parsed {
        parse(markdown, &ParseOptions::default())
    }

    fn mentions(block: &Block) -> Vec<&str> {
        block
            .spans_of(SpanKind::Mention)
            .map(|s| &block.text[s.start..s.end])
            .collect()
    }

    #[test]
    fn action_items() {
        let parsed =
            parse_default("# Sync\n## Action Items\n- [ ] @sarah: task\n- [x] @mike: done\n");

        assert_eq!(parsed.title, "Sync");
        let kinds: Vec<BlockKind> = parsed.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading(HeadingLevel::H1),
                BlockKind::Heading(HeadingLevel::H2),
                BlockKind::Checkbox { checked: false },
                BlockKind::Checkbox { checked: true },
            ]
        );
        assert_eq!(parsed.blocks[0].text, "Sync");
        assert_eq!(parsed.blocks[1].text, "Action Items");
        assert_eq!(parsed.blocks[2].text, "@sarah: task");
        assert_eq!(parsed.blocks[3].text, "@mike: done");
        assert_eq!(parsed.blocks[2].depth, 0);
        assert_eq!(parsed.blocks[2].spans, vec![Span::new(SpanKind::Mention, 0, 6)]);
        assert_eq!(mentions(&parsed.blocks[3]), vec!["@mike"]);
        assert_eq!(parsed.blocks[3].checked(), Some(true));
        assert_eq!(parsed.blocks[1].checked(), None);
    }

    #[rstest]
    #[case("# One", HeadingLevel::H1, "One")]
    #[case("## Two", HeadingLevel::H2, "Two")]
    #[case("###   Three  ", HeadingLevel::H3, "Three")]
    #[case("  # Indented", HeadingLevel::H1, "Indented")]
    fn headings(#[case] line: &str, #[case] level: HeadingLevel, #[case] text: &str) {
        let parsed = parse_default(line);
        assert_eq!(parsed.blocks, vec![Block::new(BlockKind::Heading(level), text)]);
    }

    #[rstest]
    #[case("#NoSpace")]
    #[case("#### Four")]
    #[case("-dash")]
    #[case("*emphasis*")]
    fn falls_through_to_paragraph(#[case] line: &str) {
        let parsed = parse_default(line);
        assert_eq!(parsed.blocks, vec![Block::new(BlockKind::Paragraph, line)]);
    }

    #[test]
    fn bullet_depth_from_spaces() {
        let parsed = parse_default("- top\n  - one\n    - two\n");
        let depths: Vec<usize> = parsed.blocks.iter().map(|b| b.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert!(parsed.blocks.iter().all(|b| b.kind == BlockKind::Bullet));
    }

    #[test]
    fn tab_counts_as_one_unit() {
        let parsed = parse_default("\t* tabbed\n\t  * mixed");
        assert_eq!(parsed.blocks[0].depth, 1);
        assert_eq!(parsed.blocks[1].depth, 2);
    }

    #[test]
    fn custom_indent_unit() {
        let options = ParseOptions {
            indent_unit: 4,
            ..ParseOptions::default()
        };
        let parsed = parse("    - a\n        - b\n  - c", &options);
        let depths: Vec<usize> = parsed.blocks.iter().map(|b| b.depth).collect();
        assert_eq!(depths, vec![1, 2, 0]);
    }

    #[test]
    fn empty_list_items_keep_a_block() {
        let parsed = parse_default("-\n- [ ]\n* [X]   ");
        assert_eq!(
            parsed.blocks,
            vec![
                Block::new(BlockKind::Bullet, ""),
                Block::new(BlockKind::Checkbox { checked: false }, ""),
                Block::new(BlockKind::Checkbox { checked: true }, ""),
            ]
        );
    }

    #[test]
    fn bracket_without_space_is_a_bullet() {
        let parsed = parse_default("- [x]done");
        assert_eq!(parsed.blocks, vec![Block::new(BlockKind::Bullet, "[x]done")]);
    }

    #[test]
    fn blank_lines_collapse() {
        let parsed = parse_default("a\n\n\n   \nb\n");
        let kinds: Vec<BlockKind> = parsed.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Paragraph, BlockKind::Blank, BlockKind::Paragraph]
        );
    }

    #[test]
    fn thematic_break_is_a_separator() {
        let parsed = parse_default("a\n\n---\nb");
        let kinds: Vec<BlockKind> = parsed.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Paragraph, BlockKind::Blank, BlockKind::Paragraph]
        );

        let options = ParseOptions {
            rules_as_separators: false,
            ..ParseOptions::default()
        };
        let parsed = parse("---", &options);
        assert_eq!(parsed.blocks, vec![Block::new(BlockKind::Paragraph, "---")]);
    }

    #[test]
    fn title_fallback() {
        assert_eq!(parse_default("## Only a subheading").title, DEFAULT_TITLE);
        assert_eq!(parse_default("").title, DEFAULT_TITLE);
        let options = ParseOptions {
            title_fallback: "Notes".to_string(),
            ..ParseOptions::default()
        };
        assert_eq!(parse("plain", &options).title, "Notes");
    }

    #[test]
    fn title_is_first_h1() {
        let parsed = parse_default("## Sub\n# First\n# Second");
        assert_eq!(parsed.title, "First");
    }

    #[test]
    fn mentions_in_every_kind() {
        let parsed = parse_default("# Hi @team\n- @a and @b_c\nping @d.");
        assert_eq!(mentions(&parsed.blocks[0]), vec!["@team"]);
        assert_eq!(mentions(&parsed.blocks[1]), vec!["@a", "@b_c"]);
        assert_eq!(mentions(&parsed.blocks[2]), vec!["@d"]);
    }

    #[test]
    fn lone_at_sign_is_not_a_mention() {
        let parsed = parse_default("meet @ noon");
        assert!(parsed.blocks[0].spans.is_empty());
    }

    #[test]
    fn footer_by_prefix() {
        let parsed = parse_default("Body\nMeeting recorded by: @sarah\nDuration: 45 minutes");
        assert!(parsed.blocks[0].spans_of(SpanKind::Footer).next().is_none());
        for block in &parsed.blocks[1..] {
            let footer: Vec<&Span> = block.spans_of(SpanKind::Footer).collect();
            assert_eq!(footer, vec![&Span::new(SpanKind::Footer, 0, block.text.len())]);
        }
        assert_eq!(mentions(&parsed.blocks[1]), vec!["@sarah"]);
    }

    #[test]
    fn spans_are_ordered_by_position() {
        let parsed = parse_default("Meeting recorded by: @sarah");
        assert_eq!(
            parsed.blocks[0].spans,
            vec![
                Span::new(SpanKind::Footer, 0, 27),
                Span::new(SpanKind::Mention, 21, 27),
            ]
        );
    }

    #[test]
    fn footer_prefix_only_applies_to_paragraphs() {
        let parsed = parse_default("- Duration: 10 minutes");
        assert!(parsed.blocks[0].spans.is_empty());
    }

    #[test]
    fn footer_by_pattern() {
        let options = ParseOptions {
            footer: FooterRule::Pattern(Regex::new(r"^\(.*\)$").unwrap()),
            ..ParseOptions::default()
        };
        let parsed = parse("Body\n(generated)\n", &options);
        assert!(parsed.blocks[0].spans.is_empty());
        assert_eq!(parsed.blocks[1].spans, vec![Span::new(SpanKind::Footer, 0, 11)]);
    }

    #[test]
    fn footer_last_paragraph() {
        let options = ParseOptions {
            footer: FooterRule::LastParagraph,
            ..ParseOptions::default()
        };
        let parsed = parse("First\nLast\n- trailing bullet\n\n", &options);
        assert!(parsed.blocks[0].spans.is_empty());
        assert_eq!(parsed.blocks[1].spans, vec![Span::new(SpanKind::Footer, 0, 4)]);
        assert!(parsed.blocks[2].spans.is_empty());
    }

    #[test]
    fn no_footer_rule() {
        let options = ParseOptions {
            footer: FooterRule::None,
            ..ParseOptions::default()
        };
        let parsed = parse("Duration: 1h", &options);
        assert!(parsed.blocks[0].spans.is_empty());
    }

    #[test]
    fn inline_markup_when_enabled() {
        let options = ParseOptions {
            inline_markup: true,
            ..ParseOptions::default()
        };
        let parsed = parse("- **@sarah**: *urgent*", &options);
        let block = &parsed.blocks[0];
        assert_eq!(block.text, "@sarah: urgent");
        assert_eq!(
            block.spans,
            vec![
                Span::new(SpanKind::Mention, 0, 6),
                Span::new(SpanKind::Bold, 0, 6),
                Span::new(SpanKind::Italic, 8, 14),
            ]
        );
    }

    #[test]
    fn inline_markup_off_by_default() {
        let parsed = parse_default("**bold** text");
        assert_eq!(parsed.blocks[0].text, "**bold** text");
    }

    #[test]
    fn crlf_input() {
        let parsed = parse_default("# T\r\n- a\r\n");
        assert_eq!(parsed.blocks[0].text, "T");
        assert_eq!(parsed.blocks[1].text, "a");
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = "# A\n\n- [ ] @x: y\n  * z\n\nDuration: 1m\n";
        assert_eq!(parse_default(text), parse_default(text));
    }
}
