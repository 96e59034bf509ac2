//! Token and result contracts exposed to the outer tokenizer.

use crate::lexer::diagnostics::{NeedMoreInput, RecognitionError};
use crate::lexer::rewrite::SyntheticBuffer;
use crate::lexer::span::Span;

/// A recognized expression substitution, emitted as a command substitution.
#[derive(Debug, PartialEq, Eq)]
pub struct ExprSubstitution {
    /// Original bytes consumed after the `$` marker.
    pub original_len: usize,
    /// Original-buffer span from the first trigger byte through the terminator.
    pub span: Span,
    /// Generated `[expr {...}]` text; owned by this token.
    pub synthetic: SyntheticBuffer,
}

impl ExprSubstitution {
    /// Semantic length of the emitted token, i.e. the synthetic text length.
    ///
    /// This is unrelated to how far the caller must advance; use
    /// [`ExprSubstitution::original_len`] for that.
    pub fn semantic_len(&self) -> usize {
        self.synthetic.len()
    }

    /// Consumes the token, handing the command text to the evaluator.
    pub fn into_command(self) -> String {
        self.synthetic.into_command()
    }
}

/// Outcome of one recognition attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum RecognitionResult {
    /// The bytes after `$` do not start the configured construct.
    NotApplicable,
    /// The construct was recognized and rewritten.
    Token(ExprSubstitution),
    /// The buffer ended inside the construct; read another line and retry.
    Incomplete(NeedMoreInput),
    /// The construct is malformed.
    Error(RecognitionError),
}

impl RecognitionResult {
    /// Returns the token, if any.
    pub fn token(self) -> Option<ExprSubstitution> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Returns the error, if any.
    pub fn error(self) -> Option<RecognitionError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}
