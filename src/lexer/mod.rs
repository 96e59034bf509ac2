//! Expression-substitution recognition for the outer tokenizer.
//!
//! When the tokenizer meets the `$` marker it hands a cursor positioned just
//! after it to [`Recognizer::recognize`]. A recognized `$(body)` (or the
//! tagged and doubled variants) becomes a command-substitution token whose
//! text is `[expr {body}]`, validated through a [`CommandValidator`]. The
//! token reports how many original bytes it covers so the tokenizer resumes
//! at the right place.

pub mod cursor;
pub mod delimiter;
pub mod diagnostics;
pub mod locate;
pub mod mode;
pub mod recognizer;
pub mod rewrite;
pub mod span;
pub mod token;

pub use cursor::{InputCompleteness, SourceCursor};
pub use delimiter::{ExpressionSpan, ScanState};
pub use diagnostics::{
    DiagnosticCode, LexDiagnostic, NeedMoreInput, NeedMoreReason, RecognitionError,
    RecognitionErrorKind,
};
pub use mode::{ConfigError, RecognitionMode, TriggerMatch, DEFAULT_TAG};
pub use recognizer::{
    Recognizer, RecognizerConfig, RecognizerLimits, MAX_EXPRESSION_BYTES, MAX_NESTING_DEPTH,
};
pub use rewrite::{reconcile, CommandValidator, SyntheticBuffer};
pub use span::{ByteOffset, OriginSpan, SourceId, Span};
pub use token::{ExprSubstitution, RecognitionResult};
