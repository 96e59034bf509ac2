//! Synthetic `[expr {...}]` construction and original-length reconciliation.

use std::collections::TryReserveError;

use crate::lexer::delimiter::ExpressionSpan;
use crate::lexer::diagnostics::LexDiagnostic;
use crate::lexer::mode::RecognitionMode;
use crate::lexer::span::OriginSpan;

const COMMAND_OPEN: &str = "[";
const EVALUATOR_PREFIX: &str = "expr {";
const EVALUATOR_SUFFIX: &str = "}";
const COMMAND_CLOSE: &str = "]";

/// Delegate that checks text as a single command of the host language.
///
/// Diagnostic spans returned on failure are relative to `text`.
pub trait CommandValidator {
    /// Validates `text` as command syntax at nesting `depth`.
    fn validate_command(&self, text: &str, depth: u16) -> Result<(), LexDiagnostic>;
}

/// Generated command-substitution text standing in for one construct.
///
/// The buffer has a single owner; moving it into [`SyntheticBuffer::into_command`]
/// hands the text to the evaluator, and dropping it anywhere else releases it.
#[derive(Debug, PartialEq, Eq)]
pub struct SyntheticBuffer {
    text: String,
    origin: OriginSpan,
}

impl SyntheticBuffer {
    /// Wraps `body` as `[expr {body}]`.
    pub(crate) fn build(body: &str, origin: OriginSpan) -> Result<Self, TryReserveError> {
        let len = COMMAND_OPEN.len()
            + EVALUATOR_PREFIX.len()
            + body.len()
            + EVALUATOR_SUFFIX.len()
            + COMMAND_CLOSE.len();
        let mut text = String::new();
        text.try_reserve_exact(len)?;
        text.push_str(COMMAND_OPEN);
        text.push_str(EVALUATOR_PREFIX);
        text.push_str(body);
        text.push_str(EVALUATOR_SUFFIX);
        text.push_str(COMMAND_CLOSE);
        Ok(Self { text, origin })
    }

    /// Full command-substitution text, brackets included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `expr {...}` command inside the brackets.
    pub fn command_text(&self) -> &str {
        &self.text[COMMAND_OPEN.len()..self.text.len() - COMMAND_CLOSE.len()]
    }

    /// Semantic length of the synthetic token.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always `false`; the wrapper text alone is non-empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Original-buffer location of the construct this buffer replaces.
    pub fn origin(&self) -> OriginSpan {
        self.origin
    }

    /// Consumes the buffer, yielding the bracket-less command text.
    pub fn into_command(self) -> String {
        let mut text = self.text;
        text.truncate(text.len() - COMMAND_CLOSE.len());
        text.drain(..COMMAND_OPEN.len());
        text
    }
}

/// Original bytes consumed after the `$` marker: trigger, body, terminator.
pub fn reconcile(mode: RecognitionMode, body: ExpressionSpan) -> usize {
    mode.trigger_width() + body.len + mode.terminator_width()
}
