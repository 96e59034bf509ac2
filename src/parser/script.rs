//! Script parser hosting the expression-substitution recognizer.

use tracing::trace;

use crate::lexer::{
    ByteOffset, CommandValidator, DiagnosticCode, LexDiagnostic, NeedMoreInput, NeedMoreReason,
    RecognitionResult, Recognizer, RecognizerConfig, SourceCursor, SourceId, Span,
};
use crate::parser::ast::{Command, Script, Word, WordPart};
use crate::parser::error::ParseError;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Expression-substitution recognizer configuration.
    pub recognizer: RecognizerConfig,
    /// Source id used for spans.
    pub source_id: SourceId,
}

/// Where a run of word parts stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartContext {
    /// Bare word; `nested` words also stop at `]`.
    Bare { nested: bool },
    /// Inside `"..."`.
    Quoted,
}

/// Tcl-like script parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parser {
    options: ParseOptions,
    recognizer: Recognizer,
    depth: u16,
}

impl Parser {
    /// Creates a top-level parser.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            recognizer: Recognizer::new(options.recognizer).with_source(options.source_id),
            depth: 0,
        }
    }

    /// Returns a parser for text nested `depth` command substitutions deep.
    pub fn at_depth(self, depth: u16) -> Self {
        Self { depth, ..self }
    }

    /// Returns the options.
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parses from `cursor` to the end of its buffer.
    pub fn parse_script(&self, cursor: SourceCursor<'_>) -> Result<Script, ParseError> {
        let (script, _) = self.parse_commands(cursor, None)?;
        Ok(script)
    }

    /// Parses a command substitution whose `[` precedes `cursor`.
    ///
    /// Returns the script and a cursor just past the matching `]`.
    pub fn parse_bracketed<'a>(
        &self,
        cursor: SourceCursor<'a>,
    ) -> Result<(Script, SourceCursor<'a>), ParseError> {
        let open = ByteOffset::from_usize(cursor.offset().as_usize().saturating_sub(1));
        let nested = self.at_depth(self.depth.saturating_add(1));
        nested.ensure_depth(open)?;
        nested.parse_commands(cursor, Some(open))
    }

    fn ensure_depth(&self, at: ByteOffset) -> Result<(), ParseError> {
        let max = self.options.recognizer.limits.max_nesting_depth;
        if self.depth <= max {
            return Ok(());
        }
        Err(ParseError::Syntax(LexDiagnostic::new(
            DiagnosticCode::NestingDepthExceeded,
            format!(
                "command substitution nesting depth {} exceeded limit {max}",
                self.depth
            ),
            Span::with_len(self.options.source_id, at, 1),
        )))
    }

    fn parse_commands<'a>(
        &self,
        mut cursor: SourceCursor<'a>,
        open_bracket: Option<ByteOffset>,
    ) -> Result<(Script, SourceCursor<'a>), ParseError> {
        let mut script = Script::default();

        loop {
            cursor = skip_while(cursor, |byte| {
                matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b';')
            });
            match (cursor.peek(), open_bracket) {
                (None, None) => return Ok((script, cursor)),
                (None, Some(open)) => {
                    return Err(self.missing(
                        cursor,
                        open,
                        NeedMoreReason::UnterminatedBracket,
                        DiagnosticCode::MissingCloseBracket,
                        "missing close-bracket",
                    ));
                }
                (Some(b']'), Some(_)) => {
                    let after = cursor.advance(1).unwrap_or(cursor);
                    return Ok((script, after));
                }
                (Some(_), _) => {
                    let (command, next) = self.parse_command(cursor, open_bracket.is_some())?;
                    if let Some(command) = command {
                        script.commands.push(command);
                    }
                    cursor = next;
                }
            }
        }
    }

    fn parse_command<'a>(
        &self,
        mut cursor: SourceCursor<'a>,
        nested: bool,
    ) -> Result<(Option<Command>, SourceCursor<'a>), ParseError> {
        let mut words = Vec::new();

        loop {
            cursor = skip_blanks(cursor);
            match cursor.peek() {
                None | Some(b'\n' | b';') => break,
                Some(b']') if nested => break,
                Some(_) => {
                    let (word, next) = self.parse_word(cursor, nested)?;
                    words.push(word);
                    cursor = next;
                }
            }
        }

        let command = match (words.first(), words.last()) {
            (Some(first), Some(last)) => {
                let span = Span::new(self.options.source_id, first.span.start, last.span.end);
                Some(Command { words, span })
            }
            _ => None,
        };
        Ok((command, cursor))
    }

    fn parse_word<'a>(
        &self,
        cursor: SourceCursor<'a>,
        nested: bool,
    ) -> Result<(Word, SourceCursor<'a>), ParseError> {
        match cursor.peek() {
            Some(b'{') => self.parse_braced(cursor, nested),
            Some(b'"') => self.parse_quoted(cursor, nested),
            _ => {
                let (parts, end) = self.parse_parts(cursor, PartContext::Bare { nested })?;
                Ok((self.word(parts, cursor, end), end))
            }
        }
    }

    fn parse_braced<'a>(
        &self,
        open: SourceCursor<'a>,
        nested: bool,
    ) -> Result<(Word, SourceCursor<'a>), ParseError> {
        let body_start = open.advance(1).unwrap_or(open);
        let mut cursor = body_start;
        let mut depth = 1usize;

        let close = loop {
            let Some((byte, next)) = cursor.step() else {
                return Err(self.missing(
                    cursor,
                    open.offset(),
                    NeedMoreReason::UnterminatedBrace,
                    DiagnosticCode::MissingCloseBrace,
                    "missing close-brace",
                ));
            };
            match byte {
                b'\\' => {
                    cursor = next.advance(1).unwrap_or(next);
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        break cursor;
                    }
                }
                _ => {}
            }
            cursor = next;
        };

        let after = close.advance(1).unwrap_or(close);
        self.expect_word_end(
            after,
            nested,
            DiagnosticCode::ExtraCharactersAfterCloseBrace,
            "extra characters after close-brace",
        )?;
        let text = body_start.slice_until(close).unwrap_or_default();
        let word = self.word(vec![WordPart::Text(text.to_string())], open, after);
        Ok((word, after))
    }

    fn parse_quoted<'a>(
        &self,
        open: SourceCursor<'a>,
        nested: bool,
    ) -> Result<(Word, SourceCursor<'a>), ParseError> {
        let body_start = open.advance(1).unwrap_or(open);
        let (parts, close) = self.parse_parts(body_start, PartContext::Quoted)?;
        if close.peek() != Some(b'"') {
            return Err(self.missing(
                close,
                open.offset(),
                NeedMoreReason::UnterminatedQuote,
                DiagnosticCode::MissingCloseQuote,
                "missing \"",
            ));
        }

        let after = close.advance(1).unwrap_or(close);
        self.expect_word_end(
            after,
            nested,
            DiagnosticCode::ExtraCharactersAfterCloseQuote,
            "extra characters after close-quote",
        )?;
        Ok((self.word(parts, open, after), after))
    }

    fn parse_parts<'a>(
        &self,
        mut cursor: SourceCursor<'a>,
        context: PartContext,
    ) -> Result<(Vec<WordPart>, SourceCursor<'a>), ParseError> {
        let mut parts = Vec::new();
        let mut text = Vec::new();

        while let Some((byte, next)) = cursor.step() {
            match (byte, context) {
                (b'"', PartContext::Quoted) => break,
                (byte, PartContext::Bare { nested }) if is_word_end(byte, nested) => break,
                (b'\\', _) => cursor = push_escape(next, &mut text),
                (b'$', _) => match self.parse_dollar(next)? {
                    Some((part, after)) => {
                        flush_text(&mut text, &mut parts);
                        parts.push(part);
                        cursor = after;
                    }
                    None => {
                        text.push(b'$');
                        cursor = next;
                    }
                },
                (b'[', _) => {
                    flush_text(&mut text, &mut parts);
                    let (script, after) = self.parse_bracketed(next)?;
                    parts.push(WordPart::Command(script));
                    cursor = after;
                }
                (byte, _) => {
                    text.push(byte);
                    cursor = next;
                }
            }
        }

        flush_text(&mut text, &mut parts);
        Ok((parts, cursor))
    }

    /// Handles the bytes after a `$` marker.
    fn parse_dollar<'a>(
        &self,
        after_marker: SourceCursor<'a>,
    ) -> Result<Option<(WordPart, SourceCursor<'a>)>, ParseError> {
        match self
            .recognizer
            .recognize_nested(after_marker, self.depth, self)
        {
            RecognitionResult::Token(token) => {
                let Some(after) = after_marker.advance(token.original_len) else {
                    return Err(ParseError::Syntax(LexDiagnostic::new(
                        DiagnosticCode::InvalidExpressionSyntax,
                        "expression substitution extends past the end of input",
                        token.span,
                    )));
                };
                trace!(
                    start = after_marker.offset().value(),
                    original_len = token.original_len,
                    "parsed expression substitution"
                );
                return Ok(Some((WordPart::ExprSubstitution(token), after)));
            }
            RecognitionResult::Incomplete(need) => return Err(ParseError::Incomplete(need)),
            RecognitionResult::Error(error) => return Err(ParseError::Recognition(error)),
            RecognitionResult::NotApplicable => {}
        }

        if after_marker.peek() == Some(b'{') {
            let name_start = after_marker.advance(1).unwrap_or(after_marker);
            let close = skip_while(name_start, |byte| byte != b'}');
            if close.is_eof() {
                let open = ByteOffset::from_usize(after_marker.offset().as_usize() - 1);
                return Err(self.missing(
                    close,
                    open,
                    NeedMoreReason::UnterminatedBrace,
                    DiagnosticCode::MissingCloseVariableBrace,
                    "missing close-brace for variable name",
                ));
            }
            let name = name_start.slice_until(close).unwrap_or_default();
            let after = close.advance(1).unwrap_or(close);
            return Ok(Some((WordPart::Variable(name.to_string()), after)));
        }

        let end = skip_while(after_marker, |byte| {
            byte == b'_' || byte.is_ascii_alphanumeric()
        });
        if end == after_marker {
            return Ok(None);
        }
        let name = after_marker.slice_until(end).unwrap_or_default();
        Ok(Some((WordPart::Variable(name.to_string()), end)))
    }

    fn expect_word_end(
        &self,
        after: SourceCursor<'_>,
        nested: bool,
        code: DiagnosticCode,
        message: &str,
    ) -> Result<(), ParseError> {
        match after.peek() {
            Some(byte) if !is_word_end(byte, nested) => Err(ParseError::Syntax(
                LexDiagnostic::new(
                    code,
                    message,
                    Span::with_len(self.options.source_id, after.offset(), 1),
                ),
            )),
            _ => Ok(()),
        }
    }

    fn missing(
        &self,
        at: SourceCursor<'_>,
        open: ByteOffset,
        reason: NeedMoreReason,
        code: DiagnosticCode,
        message: &str,
    ) -> ParseError {
        if at.is_interactive() {
            return ParseError::Incomplete(NeedMoreInput::new(open, reason));
        }
        ParseError::Syntax(LexDiagnostic::new(
            code,
            message,
            Span::new(self.options.source_id, open, at.offset()),
        ))
    }

    fn word(&self, parts: Vec<WordPart>, start: SourceCursor<'_>, end: SourceCursor<'_>) -> Word {
        Word {
            parts,
            span: Span::new(self.options.source_id, start.offset(), end.offset()),
        }
    }
}

impl CommandValidator for Parser {
    fn validate_command(&self, text: &str, depth: u16) -> Result<(), LexDiagnostic> {
        let validator = Parser::new(ParseOptions {
            source_id: SourceId::SYNTHETIC,
            ..self.options
        })
        .at_depth(depth);

        let script = validator
            .parse_script(SourceCursor::new(text))
            .map_err(|error| match error {
                ParseError::Syntax(diagnostic) => diagnostic,
                ParseError::Recognition(error) => error.diagnostic,
                ParseError::Incomplete(need) => LexDiagnostic::new(
                    DiagnosticCode::IncompleteInput,
                    need.to_string(),
                    Span::with_len(SourceId::SYNTHETIC, need.checkpoint, 0),
                ),
            })?;

        match script.commands.as_slice() {
            [command] if command.span.end.as_usize() == text.len() => Ok(()),
            _ => Err(LexDiagnostic::new(
                DiagnosticCode::InvalidExpressionSyntax,
                "expression closes its braces early",
                Span::with_len(SourceId::SYNTHETIC, ByteOffset::new(0), text.len()),
            )),
        }
    }
}

fn is_word_end(byte: u8, nested: bool) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b';') || (nested && byte == b']')
}

fn skip_blanks(cursor: SourceCursor<'_>) -> SourceCursor<'_> {
    let mut cursor = cursor;
    loop {
        match (cursor.peek(), cursor.peek_at(1)) {
            (Some(b' ' | b'\t' | b'\r'), _) => {}
            (Some(b'\\'), Some(b'\n')) => cursor = cursor.advance(1).unwrap_or(cursor),
            _ => return cursor,
        }
        cursor = cursor.advance(1).unwrap_or(cursor);
    }
}

fn skip_while(cursor: SourceCursor<'_>, keep: impl Fn(u8) -> bool) -> SourceCursor<'_> {
    let mut cursor = cursor;
    while let Some((byte, next)) = cursor.step() {
        if !keep(byte) {
            break;
        }
        cursor = next;
    }
    cursor
}

/// Appends the meaning of the escape whose `\` precedes `cursor`.
fn push_escape<'a>(cursor: SourceCursor<'a>, text: &mut Vec<u8>) -> SourceCursor<'a> {
    let Some((byte, next)) = cursor.step() else {
        text.push(b'\\');
        return cursor;
    };
    match byte {
        b'n' => text.push(b'\n'),
        b't' => text.push(b'\t'),
        b'r' => text.push(b'\r'),
        b'\n' => {
            text.push(b' ');
            return skip_while(next, |byte| matches!(byte, b' ' | b'\t'));
        }
        other => text.push(other),
    }
    next
}

fn flush_text(text: &mut Vec<u8>, parts: &mut Vec<WordPart>) {
    if text.is_empty() {
        return;
    }
    let bytes = std::mem::take(text);
    let text = String::from_utf8(bytes)
        .unwrap_or_else(|error| String::from_utf8_lossy(error.as_bytes()).into_owned());
    parts.push(WordPart::Text(text));
}
