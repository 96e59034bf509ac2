//! Immutable byte cursor used by the recognizer and the outer parser.

use crate::lexer::span::ByteOffset;

/// Whether more text may still arrive after the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputCompleteness {
    /// The buffer is the whole input; running out of bytes is an error.
    #[default]
    Complete,
    /// Top-level interactive read; running out of bytes asks for another line.
    Interactive,
}

/// Position inside an immutable input buffer.
///
/// Cursors are plain values: every consuming operation returns a new cursor
/// and leaves the receiver untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceCursor<'a> {
    input: &'a str,
    offset: usize,
    completeness: InputCompleteness,
}

impl<'a> SourceCursor<'a> {
    /// Creates a cursor at offset `0` of a complete buffer.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            completeness: InputCompleteness::Complete,
        }
    }

    /// Creates a cursor at offset `0` of an interactive, continuable buffer.
    pub fn interactive(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            completeness: InputCompleteness::Interactive,
        }
    }

    /// Returns this cursor with a different completeness flag.
    pub fn with_completeness(self, completeness: InputCompleteness) -> Self {
        Self {
            completeness,
            ..self
        }
    }

    /// Returns the underlying buffer.
    pub fn input(self) -> &'a str {
        self.input
    }

    /// Returns the current byte offset.
    pub fn offset(self) -> ByteOffset {
        ByteOffset::from_usize(self.offset)
    }

    /// Returns the number of unread bytes.
    pub fn remaining(self) -> usize {
        self.input.len() - self.offset
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_eof(self) -> bool {
        self.offset >= self.input.len()
    }

    /// Returns `true` if the buffer may be continued by another read.
    pub fn is_interactive(self) -> bool {
        self.completeness == InputCompleteness::Interactive
    }

    /// Returns the byte at the cursor position.
    pub fn peek(self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Returns the byte `distance` bytes past the cursor position.
    pub fn peek_at(self, distance: usize) -> Option<u8> {
        self.input
            .as_bytes()
            .get(self.offset.checked_add(distance)?)
            .copied()
    }

    /// Returns the unread bytes.
    pub fn rest(self) -> &'a [u8] {
        &self.input.as_bytes()[self.offset..]
    }

    /// Advances by `count` bytes; `None` if that would pass the end.
    pub fn advance(self, count: usize) -> Option<Self> {
        let offset = self.offset.checked_add(count)?;
        (offset <= self.input.len()).then_some(Self { offset, ..self })
    }

    /// Consumes one byte, returning it with the advanced cursor.
    pub fn step(self) -> Option<(u8, Self)> {
        let byte = self.peek()?;
        Some((byte, Self {
            offset: self.offset + 1,
            ..self
        }))
    }

    /// Returns the text between this cursor and `end`.
    ///
    /// Both cursors must sit on UTF-8 boundaries of the same buffer; an
    /// inverted or misaligned range yields `None`.
    pub fn slice_until(self, end: SourceCursor<'_>) -> Option<&'a str> {
        self.input.get(self.offset..end.offset)
    }
}
