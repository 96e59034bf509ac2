//! Tcl-like script parser: the outer tokenizer that hosts expression
//! substitution and validates its synthetic commands.

pub mod ast;
pub mod error;
mod script;

pub use ast::{Command, Script, Word, WordPart};
pub use error::ParseError;
pub use script::{ParseOptions, Parser};
