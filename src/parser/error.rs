//! Parser error contracts.

use thiserror::Error;

use crate::lexer::{LexDiagnostic, NeedMoreInput, RecognitionError, Span};

/// Failure to parse a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed braces, quotes, brackets or variable references.
    #[error("{0}")]
    Syntax(LexDiagnostic),
    /// A malformed expression substitution.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    /// The buffer ended inside an open construct of an interactive read.
    #[error("{0}")]
    Incomplete(NeedMoreInput),
}

impl ParseError {
    /// Returns the original-buffer span of the failure, when known.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax(diagnostic) => Some(diagnostic.span),
            Self::Recognition(error) => Some(error.diagnostic.span),
            Self::Incomplete(_) => None,
        }
    }

    /// Returns `true` when another line of input may complete the script.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete(_))
    }
}
