//! Parsed script structure.

use crate::lexer::{ExprSubstitution, Span};

/// A sequence of commands.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Script {
    /// Commands in source order; empty commands are omitted.
    pub commands: Vec<Command>,
}

impl Script {
    /// Returns `true` when the script contains no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// One command: a non-empty list of words.
#[derive(Debug, PartialEq, Eq)]
pub struct Command {
    /// Words, the first naming the command.
    pub words: Vec<Word>,
    /// Source span from the first word to the last.
    pub span: Span,
}

/// One word, made of literal text and substitutions.
#[derive(Debug, PartialEq, Eq)]
pub struct Word {
    /// Parts concatenated at evaluation time.
    pub parts: Vec<WordPart>,
    /// Source span, delimiters included.
    pub span: Span,
}

impl Word {
    /// Returns the text of a word with no substitutions.
    pub fn literal(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [] => Some(""),
            [WordPart::Text(text)] => Some(text),
            _ => None,
        }
    }
}

/// A piece of a word.
#[derive(Debug, PartialEq, Eq)]
pub enum WordPart {
    /// Literal text, escapes already resolved.
    Text(String),
    /// `$name` or `${name}`.
    Variable(String),
    /// `[script]`.
    Command(Script),
    /// `$(expr)` rewritten to `[expr {expr}]`.
    ExprSubstitution(ExprSubstitution),
}
