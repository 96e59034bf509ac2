//! Byte coordinates in the buffer the user typed.
//!
//! Tokens and diagnostics only ever carry original-buffer positions. A
//! recognized construct is described by its [`OriginSpan`]; a [`Span`] is
//! that range located in a particular source.

/// Buffer a [`Span`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceId(u32);

impl SourceId {
    /// Reserved for generated `[expr {...}]` text. Spans carrying it are
    /// relocated before they leave the recognizer.
    pub const SYNTHETIC: SourceId = SourceId(u32::MAX);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Whether this id names generated text.
    pub const fn is_synthetic(self) -> bool {
        self.0 == Self::SYNTHETIC.0
    }
}

/// Byte position, saturating at `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteOffset(u32);

impl ByteOffset {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn from_usize(value: usize) -> Self {
        Self(value.try_into().unwrap_or(u32::MAX))
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// The offset `delta` bytes further on.
    pub fn saturating_add(self, delta: usize) -> Self {
        Self::from_usize(self.as_usize().saturating_add(delta))
    }
}

/// Original bytes covered by one recognized construct.
///
/// `start` is the sigil (first trigger byte) and `len` counts trigger, body
/// and terminator. The `$` marker in front belongs to the outer tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginSpan {
    pub start: ByteOffset,
    pub len: usize,
}

impl OriginSpan {
    /// Offset just past the terminator, where the tokenizer resumes.
    pub fn end(self) -> ByteOffset {
        self.start.saturating_add(self.len)
    }

    /// Locates the range in `source_id`.
    pub fn span(self, source_id: SourceId) -> Span {
        Span {
            source_id,
            start: self.start,
            end: self.end(),
        }
    }
}

/// Half-open byte range `[start, end)` in one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub source_id: SourceId,
    pub start: ByteOffset,
    pub end: ByteOffset,
}

impl Span {
    /// Range between two offsets given in either order.
    pub fn new(source_id: SourceId, a: ByteOffset, b: ByteOffset) -> Self {
        Self {
            source_id,
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// `len` bytes starting at `start`.
    pub fn with_len(source_id: SourceId, start: ByteOffset, len: usize) -> Self {
        OriginSpan { start, len }.span(source_id)
    }

    pub fn len(self) -> usize {
        self.end.as_usize() - self.start.as_usize()
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}
