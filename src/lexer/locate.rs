//! Translation of diagnostics into original-buffer coordinates.

use crate::lexer::diagnostics::{
    near_text_snippet, DiagnosticCode, LexDiagnostic, RecognitionError, RecognitionErrorKind,
};
use crate::lexer::span::{ByteOffset, OriginSpan, SourceId, Span};

/// Builds every recognition diagnostic for one attempt.
///
/// All errors are anchored at the sigil; synthetic-buffer offsets are never
/// exposed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorLocator<'a> {
    input: &'a str,
    source_id: SourceId,
    sigil: ByteOffset,
}

impl<'a> ErrorLocator<'a> {
    pub(crate) fn new(input: &'a str, source_id: SourceId, sigil: ByteOffset) -> Self {
        Self {
            input,
            source_id,
            sigil,
        }
    }

    /// Error covering `[at, end)` of the original buffer.
    pub(crate) fn error_at(
        self,
        kind: RecognitionErrorKind,
        code: DiagnosticCode,
        message: impl Into<String>,
        at: ByteOffset,
        end: ByteOffset,
        suggestion: Option<String>,
    ) -> RecognitionError {
        let span = Span::new(self.source_id, at, end);
        let near_text = near_text_snippet(self.input, span.start, span.end);
        RecognitionError::new(
            kind,
            LexDiagnostic::with_context(code, message, span, near_text, suggestion),
        )
    }

    /// Error covering the construct from the sigil up to `end`.
    pub(crate) fn error(
        self,
        kind: RecognitionErrorKind,
        code: DiagnosticCode,
        message: impl Into<String>,
        end: ByteOffset,
        suggestion: Option<String>,
    ) -> RecognitionError {
        self.error_at(kind, code, message, self.sigil, end, suggestion)
    }

    /// Rewrites a diagnostic raised against synthetic text to cover `origin`.
    pub(crate) fn relocate(self, synthetic: LexDiagnostic, origin: OriginSpan) -> RecognitionError {
        let span = origin.span(self.source_id);
        RecognitionError::new(
            RecognitionErrorKind::InvalidExpressionSyntax,
            LexDiagnostic::with_context(
                DiagnosticCode::InvalidExpressionSyntax,
                format!("invalid expression substitution: {}", synthetic.message),
                span,
                near_text_snippet(self.input, span.start, span.end),
                synthetic.suggestion,
            ),
        )
    }
}
