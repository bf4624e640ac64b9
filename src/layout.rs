use crate::block::Block;

/// First writable index in a Google Docs body.
pub const DOCUMENT_BODY_START: usize = 1;

/// A range of block text in the remote document, in UTF-16 code units.
///
/// `end` is exclusive and stops before the block's trailing newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole paragraph, including its trailing newline.
    pub fn paragraph(&self) -> TextRange {
        TextRange::new(self.start, self.end + 1)
    }
}

/// Length of `text` as the Docs API counts it.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Plain text inserted into the document: one line per block, blank
/// separators included as empty lines.
pub fn payload(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(&block.text);
        out.push('\n');
    }
    out
}

/// Where each block's text lands once [`payload`] is inserted at `base_index`.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub base_index: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            base_index: DOCUMENT_BODY_START,
        }
    }
}

impl Layout {
    pub fn new(base_index: usize) -> Self {
        Self { base_index }
    }

    /// Ranges of the non-blank blocks, in block order.
    pub fn offsets(&self, blocks: &[Block]) -> Vec<TextRange> {
        let mut index = self.base_index;
        let mut ranges = Vec::with_capacity(blocks.len());
        for block in blocks {
            let len = utf16_len(&block.text);
            if !block.is_blank() {
                ranges.push(TextRange::new(index, index + len));
            }
            index += len + 1;
        }
        ranges
    }
}
