//! Library entrypoint for `exprsub`.
//!
//! The crate exposes the expression-substitution recognizer (`lexer`), the
//! Tcl-like script parser that hosts it (`parser`), and a small evaluator
//! (`interp`) that runs the rewritten `[expr {...}]` commands.

pub mod interp;
pub mod lexer;
pub mod parser;
