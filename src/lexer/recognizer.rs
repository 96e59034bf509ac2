//! Recognition of `$(...)`-style expression substitutions.

use tracing::{debug, trace};

use crate::lexer::cursor::SourceCursor;
use crate::lexer::delimiter::{scan_body, ScanOutcome};
use crate::lexer::diagnostics::{
    DiagnosticCode, NeedMoreInput, NeedMoreReason, RecognitionErrorKind,
};
use crate::lexer::locate::ErrorLocator;
use crate::lexer::mode::{RecognitionMode, TriggerMatch};
use crate::lexer::rewrite::{reconcile, CommandValidator, SyntheticBuffer};
use crate::lexer::span::{ByteOffset, OriginSpan, SourceId};
use crate::lexer::token::{ExprSubstitution, RecognitionResult};

/// Maximum nested recognition depth accepted by default.
pub const MAX_NESTING_DEPTH: u16 = 64;

/// Maximum expression body size accepted by default.
pub const MAX_EXPRESSION_BYTES: usize = 1 << 20;

/// Resource limits applied to each recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizerLimits {
    /// Deepest nesting (through command substitutions) that may be recognized.
    pub max_nesting_depth: u16,
    /// Largest expression body, in bytes.
    pub max_expression_bytes: usize,
}

impl Default for RecognizerLimits {
    fn default() -> Self {
        Self {
            max_nesting_depth: MAX_NESTING_DEPTH,
            max_expression_bytes: MAX_EXPRESSION_BYTES,
        }
    }
}

/// Immutable recognizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecognizerConfig {
    /// Active trigger syntax.
    pub mode: RecognitionMode,
    /// Resource limits.
    pub limits: RecognizerLimits,
}

impl RecognizerConfig {
    /// Creates a configuration for `mode` with default limits.
    pub fn new(mode: RecognitionMode) -> Self {
        Self {
            mode,
            limits: RecognizerLimits::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecognitionPhase {
    TriggerMatched,
    Scanning,
    Closed,
    Unterminated,
    MismatchedTerminator,
    RewriteValidated,
    RewriteRejected,
    TokenEmitted,
}

fn enter(phase: RecognitionPhase, sigil: ByteOffset) {
    trace!(?phase, sigil = sigil.value(), "expression substitution");
}

/// Recognizer for one configured trigger mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recognizer {
    config: RecognizerConfig,
    source_id: SourceId,
}

impl Recognizer {
    /// Creates a recognizer for source `0`.
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            source_id: SourceId::default(),
        }
    }

    /// Returns this recognizer reporting spans in `source_id`.
    pub fn with_source(self, source_id: SourceId) -> Self {
        Self { source_id, ..self }
    }

    /// Returns the configuration.
    pub fn config(&self) -> RecognizerConfig {
        self.config
    }

    /// Recognizes at the top level. `cursor` sits just after the `$` marker.
    pub fn recognize<V>(&self, cursor: SourceCursor<'_>, validator: &V) -> RecognitionResult
    where
        V: CommandValidator + ?Sized,
    {
        self.recognize_nested(cursor, 0, validator)
    }

    /// Recognizes at nesting `depth`, counted in enclosing command substitutions.
    ///
    /// On [`RecognitionResult::Token`] the caller advances its own cursor by
    /// `original_len`, never by the synthetic text length.
    pub fn recognize_nested<V>(
        &self,
        cursor: SourceCursor<'_>,
        depth: u16,
        validator: &V,
    ) -> RecognitionResult
    where
        V: CommandValidator + ?Sized,
    {
        let mode = self.config.mode;
        let limits = self.config.limits;
        let sigil = cursor.offset();
        let locator = ErrorLocator::new(cursor.input(), self.source_id, sigil);

        let body_start = match mode.match_trigger(cursor) {
            TriggerMatch::Matched(body_start) => body_start,
            TriggerMatch::NotApplicable => return RecognitionResult::NotApplicable,
            TriggerMatch::NeedMoreInput => {
                return RecognitionResult::Incomplete(NeedMoreInput::new(
                    sigil,
                    NeedMoreReason::TruncatedTrigger,
                ));
            }
        };
        enter(RecognitionPhase::TriggerMatched, sigil);

        if depth > limits.max_nesting_depth {
            return RecognitionResult::Error(locator.error(
                RecognitionErrorKind::NestingDepthExceeded,
                DiagnosticCode::NestingDepthExceeded,
                format!(
                    "expression substitution nesting depth {depth} exceeded limit {}",
                    limits.max_nesting_depth
                ),
                body_start.offset(),
                Some(format!(
                    "reduce nested expression substitutions to at most {} levels.",
                    limits.max_nesting_depth
                )),
            ));
        }

        enter(RecognitionPhase::Scanning, sigil);
        let (body, closed) = match scan_body(body_start, limits.max_expression_bytes) {
            ScanOutcome::Closed { body, after, .. } => (body, after),
            ScanOutcome::EndOfInput { .. } => {
                enter(RecognitionPhase::Unterminated, sigil);
                return self.unterminated(
                    cursor,
                    locator,
                    NeedMoreReason::UnterminatedExpression,
                    DiagnosticCode::MissingCloseParen,
                    mode.unterminated_message(),
                );
            }
            ScanOutcome::TooLong { at } => {
                return RecognitionResult::Error(locator.error(
                    RecognitionErrorKind::ExpressionSizeLimitExceeded,
                    DiagnosticCode::ExpressionSizeLimitExceeded,
                    format!(
                        "expression substitution exceeded configured limit ({} bytes)",
                        limits.max_expression_bytes
                    ),
                    at,
                    Some("shorten the expression or raise the expression size limit.".into()),
                ));
            }
        };

        let after = match mode {
            RecognitionMode::DoublePrefix => match closed.step() {
                Some((b')', after)) => after,
                Some(_) => {
                    enter(RecognitionPhase::MismatchedTerminator, sigil);
                    return RecognitionResult::Error(locator.error_at(
                        RecognitionErrorKind::UnbalancedDelimiter,
                        DiagnosticCode::MissingSecondCloseParen,
                        mode.missing_second_terminator_message(),
                        closed.offset(),
                        closed.offset().saturating_add(1),
                        Some(mode.close_suggestion()),
                    ));
                }
                None => {
                    enter(RecognitionPhase::MismatchedTerminator, sigil);
                    return self.unterminated(
                        cursor,
                        locator,
                        NeedMoreReason::MissingSecondTerminator,
                        DiagnosticCode::MissingSecondCloseParen,
                        mode.missing_second_terminator_message(),
                    );
                }
            },
            RecognitionMode::SinglePrefix | RecognitionMode::TaggedPrefix { .. } => closed,
        };
        enter(RecognitionPhase::Closed, sigil);

        let original_len = reconcile(mode, body);
        let origin = OriginSpan {
            start: sigil,
            len: original_len,
        };
        debug_assert_eq!(
            origin.end(),
            after.offset(),
            "reconciled length must match the measured span"
        );

        let Some(text) = body.text(cursor.input()) else {
            return RecognitionResult::Error(locator.error(
                RecognitionErrorKind::InvalidExpressionSyntax,
                DiagnosticCode::InvalidExpressionSyntax,
                "expression substitution body is not valid text",
                after.offset(),
                None,
            ));
        };
        let synthetic = match SyntheticBuffer::build(text, origin) {
            Ok(synthetic) => synthetic,
            Err(error) => {
                return RecognitionResult::Error(locator.error(
                    RecognitionErrorKind::AllocationFailure,
                    DiagnosticCode::AllocationFailure,
                    format!("cannot allocate expression substitution buffer: {error}"),
                    after.offset(),
                    None,
                ));
            }
        };

        if let Err(diagnostic) = validator.validate_command(synthetic.command_text(), depth) {
            enter(RecognitionPhase::RewriteRejected, sigil);
            debug!(
                sigil = sigil.value(),
                code = %diagnostic.code,
                "synthetic expression command rejected"
            );
            return RecognitionResult::Error(locator.relocate(diagnostic, origin));
        }
        enter(RecognitionPhase::RewriteValidated, sigil);

        debug!(
            sigil = sigil.value(),
            original_len,
            semantic_len = synthetic.len(),
            depth,
            "emitting expression substitution"
        );
        enter(RecognitionPhase::TokenEmitted, sigil);
        RecognitionResult::Token(ExprSubstitution {
            original_len,
            span: origin.span(self.source_id),
            synthetic,
        })
    }

    fn unterminated(
        &self,
        cursor: SourceCursor<'_>,
        locator: ErrorLocator<'_>,
        reason: NeedMoreReason,
        code: DiagnosticCode,
        message: String,
    ) -> RecognitionResult {
        if cursor.is_interactive() {
            return RecognitionResult::Incomplete(NeedMoreInput::new(cursor.offset(), reason));
        }

        RecognitionResult::Error(locator.error(
            RecognitionErrorKind::UnbalancedDelimiter,
            code,
            message,
            ByteOffset::from_usize(cursor.input().len()),
            Some(self.config.mode.close_suggestion()),
        ))
    }
}
