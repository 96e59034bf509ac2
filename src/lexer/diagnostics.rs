//! Diagnostic and error contracts for expression-substitution recognition.

use std::fmt;

use thiserror::Error;

use crate::lexer::span::{ByteOffset, Span};

const NEAR_TEXT_MAX_BYTES: usize = 32;

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// Input ended inside a construct that another line may complete.
    IncompleteInput,
    /// Expression substitution body never returned to paren depth zero.
    MissingCloseParen,
    /// Double-prefix form closed with `)` not followed by a second `)`.
    MissingSecondCloseParen,
    /// The generated `expr {...}` command was rejected by the command parser.
    InvalidExpressionSyntax,
    /// Nested substitutions exceeded the configured depth.
    NestingDepthExceeded,
    /// Expression body exceeded the configured size.
    ExpressionSizeLimitExceeded,
    /// The synthetic buffer could not be allocated.
    AllocationFailure,
    /// Braced word without its closing `}`.
    MissingCloseBrace,
    /// Command substitution without its closing `]`.
    MissingCloseBracket,
    /// Quoted word without its closing `"`.
    MissingCloseQuote,
    /// `${` variable reference without its closing `}`.
    MissingCloseVariableBrace,
    /// A braced word is followed by text other than a separator.
    ExtraCharactersAfterCloseBrace,
    /// A quoted word is followed by text other than a separator.
    ExtraCharactersAfterCloseQuote,
}

impl DiagnosticCode {
    /// Returns the stable textual code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncompleteInput => "incomplete-input",
            Self::MissingCloseParen => "missing-close-paren",
            Self::MissingSecondCloseParen => "missing-second-close-paren",
            Self::InvalidExpressionSyntax => "invalid-expression-syntax",
            Self::NestingDepthExceeded => "nesting-depth-exceeded",
            Self::ExpressionSizeLimitExceeded => "expression-size-limit-exceeded",
            Self::AllocationFailure => "allocation-failure",
            Self::MissingCloseBrace => "missing-close-brace",
            Self::MissingCloseBracket => "missing-close-bracket",
            Self::MissingCloseQuote => "missing-close-quote",
            Self::MissingCloseVariableBrace => "missing-close-variable-brace",
            Self::ExtraCharactersAfterCloseBrace => "extra-characters-after-close-brace",
            Self::ExtraCharactersAfterCloseQuote => "extra-characters-after-close-quote",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexDiagnostic {
    /// Machine-readable diagnostic code.
    pub code: DiagnosticCode,
    /// Human-readable message text.
    pub message: String,
    /// Source span associated with this diagnostic.
    pub span: Span,
    /// Source text near the failure, when available.
    pub near_text: Option<String>,
    /// Suggested fix, when one is known.
    pub suggestion: Option<String>,
}

impl LexDiagnostic {
    /// Creates a diagnostic value without context.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            near_text: None,
            suggestion: None,
        }
    }

    /// Creates a diagnostic value with near-text and suggestion context.
    pub fn with_context(
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
        near_text: Option<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            near_text,
            suggestion,
        }
    }
}

/// Failure categories of one recognition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognitionErrorKind {
    /// Paren depth never returned to zero, or the second terminator is missing.
    UnbalancedDelimiter,
    /// The command parser rejected the synthetic `expr {...}` form.
    InvalidExpressionSyntax,
    /// Recursion through nested command substitutions went too deep.
    NestingDepthExceeded,
    /// The expression body is larger than the configured limit.
    ExpressionSizeLimitExceeded,
    /// The synthetic buffer could not be allocated.
    AllocationFailure,
}

/// Structured recognition failure, always in original-buffer coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{diagnostic}")]
pub struct RecognitionError {
    /// Failure category.
    pub kind: RecognitionErrorKind,
    /// Diagnostic located in the original buffer.
    pub diagnostic: LexDiagnostic,
}

impl RecognitionError {
    /// Creates a recognition error.
    pub fn new(kind: RecognitionErrorKind, diagnostic: LexDiagnostic) -> Self {
        Self { kind, diagnostic }
    }

    /// Returns the original-buffer offset the error points at.
    pub fn offset(&self) -> ByteOffset {
        self.diagnostic.span.start
    }

    /// Returns the user-visible message.
    pub fn message(&self) -> &str {
        &self.diagnostic.message
    }

    /// Returns `true` for failures the host cannot recover from.
    pub fn is_fatal(&self) -> bool {
        self.kind == RecognitionErrorKind::AllocationFailure
    }
}

/// Reason why more input is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedMoreReason {
    /// A multi-byte trigger was cut off at the end of the buffer.
    TruncatedTrigger,
    /// The expression body is still open.
    UnterminatedExpression,
    /// A double-prefix body closed but the second `)` has not arrived.
    MissingSecondTerminator,
    /// A braced word is still open.
    UnterminatedBrace,
    /// A quoted word is still open.
    UnterminatedQuote,
    /// A command substitution is still open.
    UnterminatedBracket,
}

/// Request for another line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeedMoreInput {
    /// Byte position of the construct that is still open.
    pub checkpoint: ByteOffset,
    /// The reason more input is required.
    pub reason: NeedMoreReason,
}

impl NeedMoreInput {
    /// Creates an incomplete-input value.
    pub fn new(checkpoint: ByteOffset, reason: NeedMoreReason) -> Self {
        Self { checkpoint, reason }
    }
}

impl fmt::Display for NeedMoreInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "incomplete input at byte {}: {:?}",
            self.checkpoint.value(),
            self.reason
        )
    }
}

/// Returns a short, escaped excerpt of `input[start..end]`.
pub(crate) fn near_text_snippet(
    input: &str,
    start: ByteOffset,
    end: ByteOffset,
) -> Option<String> {
    let bytes = input.as_bytes();
    let start = start.as_usize().min(bytes.len());
    let end = end.as_usize().clamp(start, bytes.len());
    if start == end {
        return None;
    }

    let end = end.min(start.saturating_add(NEAR_TEXT_MAX_BYTES));
    let excerpt = String::from_utf8_lossy(&bytes[start..end]);
    Some(excerpt.escape_default().to_string())
}
