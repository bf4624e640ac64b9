use serde::Serialize;

use crate::block::{Block, BlockKind, HeadingLevel, Span, SpanKind};
use crate::error::AlignmentError;
use crate::layout::{TextRange, utf16_len};

/// An RGB colour with channels in `0.0..=1.0`, the form the Docs API takes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Parse `#RRGGBB` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

pub const MENTION_BLUE: Rgb = Rgb::new(0.0, 0.4, 0.8);
pub const FOOTER_GREY: Rgb = Rgb::new(0.4, 0.4, 0.4);

/// Colours used for run-level styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub mention: Rgb,
    pub footer: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            mention: MENTION_BLUE,
            footer: FOOTER_GREY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Normal,
    Heading(HeadingLevel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bulleted,
    Checklist { checked: bool },
}

/// Run-level attributes. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub foreground: Option<Rgb>,
}

/// One styling instruction against a range of the inserted document
#[derive(Debug, Clone, PartialEq)]
pub enum StyleOperation {
    Paragraph {
        range: TextRange,
        style: ParagraphStyle,
    },
    List {
        range: TextRange,
        list: ListKind,
        depth: usize,
    },
    Text {
        range: TextRange,
        style: TextStyle,
    },
}

impl StyleOperation {
    pub fn range(&self) -> TextRange {
        match self {
            StyleOperation::Paragraph { range, .. }
            | StyleOperation::List { range, .. }
            | StyleOperation::Text { range, .. } => *range,
        }
    }
}

/// Turn blocks and the ranges their text occupies into style operations.
///
/// `offsets` has one entry per non-blank block, in block order. Operations
/// come out block by block in ascending document order; within a block the
/// order is paragraph style, list membership, inline emphasis, mentions,
/// footer. Nothing is produced if the offsets do not line up.
pub fn blocks_to_operations(
    blocks: &[Block],
    offsets: &[TextRange],
    theme: &Theme,
) -> Result<Vec<StyleOperation>, AlignmentError> {
    check_alignment(blocks, offsets)?;

    let mut ops = Vec::new();
    let styled = blocks.iter().filter(|b| !b.is_blank());
    for (block, range) in styled.zip(offsets) {
        emit_block(block, *range, theme, &mut ops);
    }
    Ok(ops)
}

fn check_alignment(blocks: &[Block], offsets: &[TextRange]) -> Result<(), AlignmentError> {
    let expected = blocks.iter().filter(|b| !b.is_blank()).count();
    if offsets.len() != expected {
        return Err(AlignmentError::CountMismatch {
            expected,
            actual: offsets.len(),
        });
    }

    let styled = blocks.iter().filter(|b| !b.is_blank());
    let mut previous_end: Option<usize> = None;
    for (index, (block, range)) in styled.zip(offsets).enumerate() {
        // paragraph ops extend the range over its newline
        if range.start > range.end || range.end == usize::MAX {
            return Err(AlignmentError::InvalidRange {
                index,
                start: range.start,
                end: range.end,
            });
        }
        if let Some(previous_end) = previous_end {
            if range.start <= previous_end {
                return Err(AlignmentError::OutOfOrder {
                    index,
                    start: range.start,
                    previous_end,
                });
            }
        }
        let text_len = utf16_len(&block.text);
        if range.len() != text_len {
            return Err(AlignmentError::LengthMismatch {
                index,
                expected: text_len,
                actual: range.len(),
            });
        }
        previous_end = Some(range.end);
    }
    Ok(())
}

fn emit_block(block: &Block, range: TextRange, theme: &Theme, ops: &mut Vec<StyleOperation>) {
    let style = match block.kind {
        BlockKind::Heading(level) => ParagraphStyle::Heading(level),
        _ => ParagraphStyle::Normal,
    };
    ops.push(StyleOperation::Paragraph {
        range: range.paragraph(),
        style,
    });

    let list = match block.kind {
        BlockKind::Bullet => Some(ListKind::Bulleted),
        BlockKind::Checkbox { checked } => Some(ListKind::Checklist { checked }),
        _ => None,
    };
    if let Some(list) = list {
        ops.push(StyleOperation::List {
            range: range.paragraph(),
            list,
            depth: block.depth,
        });
    }

    for span in &block.spans {
        let style = match span.kind {
            SpanKind::Bold => TextStyle {
                bold: Some(true),
                ..TextStyle::default()
            },
            SpanKind::Italic => TextStyle {
                italic: Some(true),
                ..TextStyle::default()
            },
            _ => continue,
        };
        ops.push(StyleOperation::Text {
            range: span_range(block, range, span.start, span.end),
            style,
        });
    }

    for span in block.spans_of(SpanKind::Mention) {
        ops.push(StyleOperation::Text {
            range: span_range(block, range, span.start, span.end),
            style: TextStyle {
                bold: Some(true),
                foreground: Some(theme.mention),
                ..TextStyle::default()
            },
        });
    }

    for footer in block.spans_of(SpanKind::Footer) {
        for (start, end) in footer_segments(block, footer) {
            ops.push(StyleOperation::Text {
                range: span_range(block, range, start, end),
                style: TextStyle {
                    italic: Some(true),
                    foreground: Some(theme.footer),
                    ..TextStyle::default()
                },
            });
        }
    }
}

/// Byte ranges of the footer that are not covered by a mention, so mention
/// colouring survives the footer colour.
fn footer_segments(block: &Block, footer: &Span) -> Vec<(usize, usize)> {
    let mut mentions: Vec<&Span> = block
        .spans_of(SpanKind::Mention)
        .filter(|m| m.end > footer.start && m.start < footer.end)
        .collect();
    mentions.sort_by_key(|m| m.start);

    let mut segments = Vec::new();
    let mut cursor = footer.start;
    for mention in mentions {
        if mention.start > cursor {
            segments.push((cursor, mention.start));
        }
        cursor = cursor.max(mention.end);
    }
    if cursor < footer.end {
        segments.push((cursor, footer.end));
    }
    segments
}

fn span_range(block: &Block, range: TextRange, start: usize, end: usize) -> TextRange {
    let text = &block.text;
    TextRange::new(
        range.start + utf16_len(&text[..start]),
        range.start + utf16_len(&text[..end]),
    )
}
