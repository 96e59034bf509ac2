//! Trigger syntaxes accepted after the `$` substitution marker.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::lexer::cursor::SourceCursor;

/// Tag byte used by [`RecognitionMode::TaggedPrefix`] when none is configured.
pub const DEFAULT_TAG: u8 = b'=';

/// The configured trigger syntax of one recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecognitionMode {
    /// `$(expr)`
    #[default]
    SinglePrefix,
    /// `$<tag>(expr)`, e.g. `$=(expr)`
    TaggedPrefix {
        /// Byte between the marker and the opening paren.
        tag: u8,
    },
    /// `$((expr))`
    DoublePrefix,
}

/// Outcome of matching a trigger at a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMatch<'a> {
    /// The trigger matched; the cursor sits on the first body byte.
    Matched(SourceCursor<'a>),
    /// The bytes do not start this construct.
    NotApplicable,
    /// The buffer ends inside a multi-byte trigger.
    NeedMoreInput,
}

/// Invalid recognizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The tag byte would collide with other lexical forms.
    #[error("invalid expression-substitution tag {0:?}")]
    InvalidTag(char),
    /// The mode name is not one of `single`, `double`, `tagged`, `tagged:<c>`.
    #[error("unknown expression-substitution mode `{0}`")]
    UnknownMode(String),
}

impl RecognitionMode {
    /// Creates a tagged-prefix mode, rejecting tags that collide with other syntax.
    pub fn tagged(tag: char) -> Result<Self, ConfigError> {
        match u8::try_from(tag) {
            Ok(byte) if is_valid_tag(byte) => Ok(Self::TaggedPrefix { tag: byte }),
            _ => Err(ConfigError::InvalidTag(tag)),
        }
    }

    /// Number of bytes between the marker and the body.
    pub const fn trigger_width(self) -> usize {
        match self {
            Self::SinglePrefix => 1,
            Self::TaggedPrefix { .. } | Self::DoublePrefix => 2,
        }
    }

    /// Number of bytes closing the body.
    pub const fn terminator_width(self) -> usize {
        match self {
            Self::SinglePrefix | Self::TaggedPrefix { .. } => 1,
            Self::DoublePrefix => 2,
        }
    }

    /// Surface form used in messages, e.g. `$((...))`.
    pub fn form(self) -> String {
        match self {
            Self::SinglePrefix => "$(...)".to_string(),
            Self::TaggedPrefix { tag } => format!("${}(...)", char::from(tag)),
            Self::DoublePrefix => "$((...))".to_string(),
        }
    }

    /// Message for a body that never reaches its terminator.
    pub fn unterminated_message(self) -> String {
        match self {
            Self::DoublePrefix => format!(
                "missing close-paren pair in {} expression substitution",
                self.form()
            ),
            _ => format!("missing close-paren in {} expression substitution", self.form()),
        }
    }

    /// Message for a double-prefix body whose first `)` is not followed by another.
    pub fn missing_second_terminator_message(self) -> String {
        format!(
            "missing second close-paren in {} expression substitution",
            self.form()
        )
    }

    /// Suggested fix attached to unterminated diagnostics.
    pub fn close_suggestion(self) -> String {
        let closer = ")".repeat(self.terminator_width());
        format!("close the expression substitution with `{closer}`.")
    }

    fn trigger_bytes(self) -> ([u8; 2], usize) {
        match self {
            Self::SinglePrefix => ([b'(', 0], 1),
            Self::TaggedPrefix { tag } => ([tag, b'('], 2),
            Self::DoublePrefix => ([b'(', b'('], 2),
        }
    }

    /// Matches this mode's trigger at `cursor`, positioned just after `$`.
    ///
    /// A buffer that ends partway through a multi-byte trigger asks for more
    /// input only when the cursor is interactive; an empty remainder never
    /// does, because a trailing `$` is an ordinary literal.
    pub fn match_trigger(self, cursor: SourceCursor<'_>) -> TriggerMatch<'_> {
        let (bytes, width) = self.trigger_bytes();
        let trigger = &bytes[..width];
        let rest = cursor.rest();

        if rest.starts_with(trigger) {
            return match cursor.advance(width) {
                Some(body) => TriggerMatch::Matched(body),
                None => TriggerMatch::NotApplicable,
            };
        }

        let truncated = !rest.is_empty() && rest.len() < width && trigger.starts_with(rest);
        if truncated && cursor.is_interactive() {
            return TriggerMatch::NeedMoreInput;
        }

        TriggerMatch::NotApplicable
    }
}

impl fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SinglePrefix => f.write_str("single"),
            Self::TaggedPrefix { tag } => write!(f, "tagged:{}", char::from(*tag)),
            Self::DoublePrefix => f.write_str("double"),
        }
    }
}

impl FromStr for RecognitionMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "single" => Ok(Self::SinglePrefix),
            "double" => Ok(Self::DoublePrefix),
            "tagged" => Ok(Self::TaggedPrefix { tag: DEFAULT_TAG }),
            other => {
                let Some(tag) = other.strip_prefix("tagged:") else {
                    return Err(ConfigError::UnknownMode(other.to_string()));
                };
                let mut chars = tag.chars();
                match (chars.next(), chars.next()) {
                    (Some(tag), None) => Self::tagged(tag),
                    _ => Err(ConfigError::UnknownMode(other.to_string())),
                }
            }
        }
    }
}

fn is_valid_tag(byte: u8) -> bool {
    byte.is_ascii_punctuation()
        && !matches!(
            byte,
            b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'"' | b'\\' | b'$' | b';' | b'_'
        )
}
