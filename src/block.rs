/// Heading levels understood by the parser (`#` through `###`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_marker_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

/// What a single source line turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(HeadingLevel),
    Bullet,
    Checkbox { checked: bool },
    Paragraph,
    /// Structural separator. Carries no text and receives no offsets.
    Blank,
}

impl BlockKind {
    pub fn is_list(&self) -> bool {
        matches!(self, BlockKind::Bullet | BlockKind::Checkbox { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpanKind {
    Mention,
    Footer,
    Bold,
    Italic,
}

/// A tagged sub-range of a block's text.
///
/// `start` and `end` are byte offsets into [`Block::text`], always on char
/// boundaries, so `&block.text[span.start..span.end]` is the spanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// One line-derived unit of the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    /// Nesting level for list items, 0 for everything else
    pub depth: usize,
    /// Sorted by `start`, then by kind in declaration order
    pub spans: Vec<Span>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            depth: 0,
            spans: Vec::new(),
        }
    }

    pub fn blank() -> Self {
        Self::new(BlockKind::Blank, String::new())
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.kind == BlockKind::Blank
    }

    pub fn spans_of(&self, kind: SpanKind) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(move |span| span.kind == kind)
    }

    /// The `checked` state of a checkbox item, `None` for every other kind.
    pub fn checked(&self) -> Option<bool> {
        match self.kind {
            BlockKind::Checkbox { checked } => Some(checked),
            _ => None,
        }
    }
}
