//! Paren-balancing scan over an expression substitution body.
//!
//! Bracketed command substitutions and quoted strings open sub-contexts in
//! which parentheses are ordinary text. Quote toggling is ignored while
//! inside brackets, and brackets are ignored while inside a quote; the
//! resulting asymmetry for quotes that straddle a bracket boundary is kept
//! as-is and pinned by tests.

use tracing::trace;

use crate::lexer::cursor::SourceCursor;
use crate::lexer::span::ByteOffset;

/// Balancing state for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    /// Open parens, including the one from the trigger.
    pub paren_depth: u32,
    /// Open brackets; may go negative on a stray `]`.
    pub bracket_depth: i32,
    /// Inside a `"` region opened at bracket depth zero.
    pub in_quote: bool,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            paren_depth: 1,
            bracket_depth: 0,
            in_quote: false,
        }
    }
}

impl ScanState {
    fn parens_are_structural(self) -> bool {
        self.bracket_depth <= 0 && !self.in_quote
    }

    /// Applies one non-escape byte. Returns `true` when it closes the body.
    pub fn observe(&mut self, byte: u8) -> bool {
        match byte {
            b'(' if self.parens_are_structural() => self.paren_depth += 1,
            b'"' if self.bracket_depth == 0 => self.in_quote = !self.in_quote,
            b')' if self.parens_are_structural() => {
                self.paren_depth -= 1;
                return self.paren_depth == 0;
            }
            b']' if !self.in_quote => self.bracket_depth -= 1,
            b'[' if !self.in_quote => self.bracket_depth += 1,
            _ => {}
        }
        false
    }
}

/// Raw expression body inside the original buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionSpan {
    /// Offset of the first body byte.
    pub start: ByteOffset,
    /// Body length in bytes, excluding trigger and terminator.
    pub len: usize,
}

impl ExpressionSpan {
    /// Returns the body text from the buffer it was scanned in.
    pub fn text(self, input: &str) -> Option<&str> {
        let start = self.start.as_usize();
        input.get(start..start.checked_add(self.len)?)
    }
}

/// Result of scanning one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome<'a> {
    /// The matching `)` was found.
    Closed {
        /// The body, exclusive of the trigger and the closing `)`.
        body: ExpressionSpan,
        /// Cursor just past the closing `)`.
        after: SourceCursor<'a>,
        /// State at the moment the body closed.
        state: ScanState,
    },
    /// The buffer ended first.
    EndOfInput {
        /// State when the bytes ran out.
        state: ScanState,
    },
    /// The body grew past `max_body_bytes`.
    TooLong {
        /// Offset of the first byte past the limit.
        at: ByteOffset,
    },
}

/// Scans from the first body byte to the paren that returns depth to zero.
pub fn scan_body(start: SourceCursor<'_>, max_body_bytes: usize) -> ScanOutcome<'_> {
    let mut state = ScanState::default();
    let mut cursor = start;

    loop {
        let consumed = cursor.offset().as_usize() - start.offset().as_usize();
        if consumed > max_body_bytes {
            return ScanOutcome::TooLong {
                at: cursor.offset(),
            };
        }

        let Some((byte, next)) = cursor.step() else {
            trace!(?state, "expression body reached end of input");
            return ScanOutcome::EndOfInput { state };
        };

        if byte == b'\\' {
            match next.step() {
                Some((_, escaped)) => {
                    cursor = escaped;
                    continue;
                }
                None => return ScanOutcome::EndOfInput { state },
            }
        }

        if state.observe(byte) {
            return ScanOutcome::Closed {
                body: ExpressionSpan {
                    start: start.offset(),
                    len: consumed,
                },
                after: next,
                state,
            };
        }
        cursor = next;
    }
}
