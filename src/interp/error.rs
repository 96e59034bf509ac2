//! Evaluation error contracts.

use thiserror::Error;

use crate::parser::ParseError;

/// Failure while evaluating a script or expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The script did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// No builtin with this name exists.
    #[error("invalid command name \"{0}\"")]
    UnknownCommand(String),
    /// The variable has never been set.
    #[error("can't read \"{0}\": no such variable")]
    UnknownVariable(String),
    /// A builtin was called with the wrong number of words.
    #[error("wrong # args: should be \"{0}\"")]
    WrongArgs(&'static str),
    /// Malformed expression or operand type error.
    #[error("{0}")]
    Expression(String),
    /// Integer division or remainder by zero.
    #[error("divide by zero")]
    DivideByZero,
    /// Integer arithmetic overflowed.
    #[error("integer value too large to represent")]
    IntegerOverflow,
    /// Evaluation recursed through too many command substitutions.
    #[error("too many nested evaluations (limit {0})")]
    NestingTooDeep(u16),
}

impl EvalError {
    pub(crate) fn non_numeric(text: &str, op: &str) -> Self {
        Self::Expression(format!(
            "can't use non-numeric string \"{text}\" as operand of \"{op}\""
        ))
    }
}
