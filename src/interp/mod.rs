//! Minimal interpreter used to evaluate parsed scripts.
//!
//! Builtins: `set name ?value?`, `expr arg ?arg ...?`, `concat ?arg ...?`,
//! `incr name ?amount?`. An expression substitution is evaluated exactly
//! like the command substitution it stands for.

pub mod error;
pub mod expr;
pub mod value;

use std::collections::HashMap;

use tracing::trace;

use crate::lexer::{RecognizerConfig, SourceCursor, SourceId};
use crate::parser::{Command, ParseOptions, Parser, Script, Word, WordPart};

pub use error::EvalError;
pub use expr::{eval_expr, ExprContext};
pub use value::Value;

/// Variables plus the parser configuration used for nested evaluation.
#[derive(Debug, Clone)]
pub struct Interp {
    parser: Parser,
    vars: HashMap<String, String>,
    depth: u16,
}

impl Interp {
    /// Creates an interpreter whose parser recognizes `config`.
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            parser: Parser::new(ParseOptions {
                recognizer: config,
                source_id: SourceId::new(0),
            }),
            vars: HashMap::new(),
            depth: 0,
        }
    }

    /// Sets a variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Returns a variable's value.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Parses `script` as a complete buffer and evaluates it.
    ///
    /// Returns the result of the last command, or an empty string.
    pub fn eval(&mut self, script: &str) -> Result<String, EvalError> {
        let parsed = self
            .parser
            .at_depth(self.depth)
            .parse_script(SourceCursor::new(script))?;
        self.eval_script(parsed)
    }

    /// Evaluates an already parsed script, consuming it.
    pub fn eval_script(&mut self, script: Script) -> Result<String, EvalError> {
        let mut result = String::new();
        for command in script.commands {
            result = self.eval_command(command)?;
        }
        Ok(result)
    }

    fn eval_command(&mut self, command: Command) -> Result<String, EvalError> {
        let mut args = Vec::with_capacity(command.words.len());
        for word in command.words {
            args.push(self.eval_word(word)?);
        }
        self.invoke(&args)
    }

    fn eval_word(&mut self, word: Word) -> Result<String, EvalError> {
        let mut out = String::new();
        for part in word.parts {
            match part {
                WordPart::Text(text) => out.push_str(&text),
                WordPart::Variable(name) => out.push_str(&self.variable(&name)?),
                WordPart::Command(script) => {
                    let value = self.nested(|interp| interp.eval_script(script))?;
                    out.push_str(&value);
                }
                WordPart::ExprSubstitution(token) => {
                    let command = token.into_command();
                    trace!(command = %command, "evaluating expression substitution");
                    let value = self.nested(|interp| interp.eval(&command))?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.enter()?;
        let result = f(self);
        self.leave();
        result
    }

    /// Takes one nesting level. Command substitutions, expression
    /// substitutions and expression operators share the same budget.
    fn enter(&mut self) -> Result<(), EvalError> {
        let max = self.parser.options().recognizer.limits.max_nesting_depth;
        if self.depth >= max {
            return Err(EvalError::NestingTooDeep(max));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn invoke(&mut self, args: &[String]) -> Result<String, EvalError> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(String::new());
        };
        match name.as_str() {
            "set" => match rest {
                [var] => self.variable(var),
                [var, value] => {
                    self.set_var(var.clone(), value.clone());
                    Ok(value.clone())
                }
                _ => Err(EvalError::WrongArgs("set varName ?newValue?")),
            },
            "expr" => {
                if rest.is_empty() {
                    return Err(EvalError::WrongArgs("expr arg ?arg ...?"));
                }
                let text = rest.join(" ");
                Ok(eval_expr(&text, self)?.to_string())
            }
            "concat" => Ok(rest
                .iter()
                .map(|arg| arg.trim())
                .filter(|arg| !arg.is_empty())
                .collect::<Vec<_>>()
                .join(" ")),
            "incr" => {
                let (var, amount) = match rest {
                    [var] => (var, 1),
                    [var, amount] => (var, parse_increment(amount)?),
                    _ => return Err(EvalError::WrongArgs("incr varName ?increment?")),
                };
                let current = match self.var(var) {
                    Some(value) => parse_increment(value)?,
                    None => 0,
                };
                let next = current
                    .checked_add(amount)
                    .ok_or(EvalError::IntegerOverflow)?
                    .to_string();
                self.set_var(var.clone(), next.clone());
                Ok(next)
            }
            other => Err(EvalError::UnknownCommand(other.to_string())),
        }
    }

    fn variable(&self, name: &str) -> Result<String, EvalError> {
        self.var(name)
            .map(str::to_string)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl ExprContext for Interp {
    fn variable(&self, name: &str) -> Result<String, EvalError> {
        Interp::variable(self, name)
    }

    fn parse_command<'a>(
        &self,
        cursor: SourceCursor<'a>,
    ) -> Result<(Script, SourceCursor<'a>), EvalError> {
        Ok(self.parser.at_depth(self.depth).parse_bracketed(cursor)?)
    }

    fn run_command(&mut self, script: Script) -> Result<String, EvalError> {
        self.nested(|interp| interp.eval_script(script))
    }

    fn enter_nested(&mut self) -> Result<(), EvalError> {
        self.enter()
    }

    fn leave_nested(&mut self) {
        self.leave();
    }
}

fn parse_increment(text: &str) -> Result<i64, EvalError> {
    match Value::from_text(text) {
        Value::Int(value) => Ok(value),
        _ => Err(EvalError::Expression(format!(
            "expected integer but got \"{text}\""
        ))),
    }
}
