//! Expression evaluator invoked by the `expr` builtin.
//!
//! Tokenizing parses operands but runs no substitutions. `$var` and `[...]`
//! are resolved only when the evaluator reaches them, so the untaken side of
//! `?:`, `&&` and `||` is consumed without touching the host. A
//! recursive-descent pass applies operators from lowest to highest
//! precedence: `?:`, `||`, `&&`, `|`, `^`, `&`, `eq ne`, `== !=`,
//! `< > <= >=`, `<< >>`, `+ -`, `* / %`, unary `- + ! ~`, primary.
//!
//! Every parenthesis, function call, unary operator and `?:` branch takes one
//! level from the host's nesting budget.

use std::cmp::Ordering;

use crate::interp::error::EvalError;
use crate::interp::value::Value;
use crate::lexer::SourceCursor;
use crate::parser::Script;

/// Host services an expression needs for substitutions.
pub trait ExprContext {
    /// Returns the value of variable `name`.
    fn variable(&self, name: &str) -> Result<String, EvalError>;

    /// Parses the command substitution whose `[` precedes `cursor`.
    ///
    /// Returns the script and a cursor just past the matching `]`. Nothing
    /// is evaluated.
    fn parse_command<'a>(
        &self,
        cursor: SourceCursor<'a>,
    ) -> Result<(Script, SourceCursor<'a>), EvalError>;

    /// Evaluates a command substitution parsed by [`ExprContext::parse_command`].
    fn run_command(&mut self, script: Script) -> Result<String, EvalError>;

    /// Takes one nesting level, failing once the limit is reached.
    fn enter_nested(&mut self) -> Result<(), EvalError>;

    /// Returns a level taken by [`ExprContext::enter_nested`].
    fn leave_nested(&mut self);
}

/// Evaluates `text` as an expression.
pub fn eval_expr<C>(text: &str, ctx: &mut C) -> Result<Value, EvalError>
where
    C: ExprContext + ?Sized,
{
    let tokens = tokenize(text, &*ctx)?;
    let mut evaluator = ExprEvaluator {
        tokens,
        pos: 0,
        skipping: false,
        ctx,
    };
    let value = evaluator.parse_ternary()?;
    match evaluator.current() {
        ExprToken::Eof => Ok(value),
        other => Err(syntax_error(text, &format!("unexpected {other:?}"))),
    }
}

// ---------------------------------------------------------------------------
// ExprToken
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum ExprToken {
    Operand(Operand),
    Func(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Tilde,
    Bang,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    StrEq,
    StrNe,
    Question,
    Colon,
    Comma,
    LParen,
    RParen,
    Eof,
}

/// Operand whose substitutions have not run yet.
#[derive(Debug, PartialEq)]
enum Operand {
    Literal(Value),
    Variable(String),
    Command(Script),
    Quoted(Vec<QuotedPart>),
}

#[derive(Debug, PartialEq)]
enum QuotedPart {
    Text(Vec<u8>),
    Variable(String),
    Command(Script),
}

fn syntax_error(text: &str, detail: &str) -> EvalError {
    EvalError::Expression(format!("syntax error in expression \"{text}\": {detail}"))
}

fn tokenize<C>(text: &str, ctx: &C) -> Result<Vec<ExprToken>, EvalError>
where
    C: ExprContext + ?Sized,
{
    let mut tokens = Vec::new();
    let mut cursor = SourceCursor::new(text);

    loop {
        while cursor.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            cursor = cursor.advance(1).unwrap_or(cursor);
        }
        let Some((byte, next)) = cursor.step() else {
            tokens.push(ExprToken::Eof);
            return Ok(tokens);
        };

        let (token, after) = match byte {
            b'0'..=b'9' | b'.' => scan_number(cursor, text)?,
            b'$' => {
                let (name, after) = scan_variable(next, text)?;
                (ExprToken::Operand(Operand::Variable(name)), after)
            }
            b'[' => {
                let (script, after) = ctx.parse_command(next)?;
                (ExprToken::Operand(Operand::Command(script)), after)
            }
            b'"' => {
                let (operand, after) = scan_quoted(next, text, ctx)?;
                (ExprToken::Operand(operand), after)
            }
            b'{' => {
                let (value, after) = scan_braced(next, text)?;
                let literal = Operand::Literal(Value::from_text(&value));
                (ExprToken::Operand(literal), after)
            }
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => scan_word(cursor, text)?,
            _ => scan_operator(cursor, text)?,
        };
        tokens.push(token);
        cursor = after;
    }
}

fn scan_number<'a>(
    start: SourceCursor<'a>,
    text: &str,
) -> Result<(ExprToken, SourceCursor<'a>), EvalError> {
    let mut cursor = start;
    let mut previous = 0u8;
    while let Some((byte, next)) = cursor.step() {
        let exponent_sign = matches!(byte, b'+' | b'-') && matches!(previous, b'e' | b'E');
        if !(byte.is_ascii_alphanumeric() || byte == b'.' || exponent_sign) {
            break;
        }
        previous = byte;
        cursor = next;
    }

    let literal = start.slice_until(cursor).unwrap_or_default();
    match Value::from_text(literal) {
        Value::Str(_) => Err(syntax_error(
            text,
            &format!("invalid number \"{literal}\""),
        )),
        value => Ok((ExprToken::Operand(Operand::Literal(value)), cursor)),
    }
}

fn scan_variable<'a>(
    cursor: SourceCursor<'a>,
    text: &str,
) -> Result<(String, SourceCursor<'a>), EvalError> {
    if cursor.peek() == Some(b'{') {
        let start = cursor.advance(1).unwrap_or(cursor);
        let mut end = start;
        while let Some((byte, next)) = end.step() {
            if byte == b'}' {
                let name = start.slice_until(end).unwrap_or_default();
                return Ok((name.to_string(), next));
            }
            end = next;
        }
        return Err(syntax_error(text, "missing close-brace for variable name"));
    }

    let mut end = cursor;
    while let Some((byte, next)) = end.step() {
        if !(byte == b'_' || byte.is_ascii_alphanumeric()) {
            break;
        }
        end = next;
    }
    let name = cursor.slice_until(end).unwrap_or_default();
    if name.is_empty() {
        return Err(syntax_error(text, "missing variable name after \"$\""));
    }
    Ok((name.to_string(), end))
}

fn scan_quoted<'a, C>(
    mut cursor: SourceCursor<'a>,
    text: &str,
    ctx: &C,
) -> Result<(Operand, SourceCursor<'a>), EvalError>
where
    C: ExprContext + ?Sized,
{
    let mut parts = Vec::new();
    let mut literal = Vec::new();
    loop {
        let Some((byte, next)) = cursor.step() else {
            return Err(syntax_error(text, "missing \""));
        };
        match byte {
            b'"' => {
                if parts.is_empty() {
                    let value = String::from_utf8_lossy(&literal).into_owned();
                    return Ok((Operand::Literal(Value::Str(value)), next));
                }
                flush_literal(&mut parts, &mut literal);
                return Ok((Operand::Quoted(parts), next));
            }
            b'\\' => match next.step() {
                Some((escaped, after)) => {
                    literal.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        other => other,
                    });
                    cursor = after;
                }
                None => return Err(syntax_error(text, "missing \"")),
            },
            b'$' => {
                let (name, after) = scan_variable(next, text)?;
                flush_literal(&mut parts, &mut literal);
                parts.push(QuotedPart::Variable(name));
                cursor = after;
            }
            b'[' => {
                let (script, after) = ctx.parse_command(next)?;
                flush_literal(&mut parts, &mut literal);
                parts.push(QuotedPart::Command(script));
                cursor = after;
            }
            other => {
                literal.push(other);
                cursor = next;
            }
        }
    }
}

fn flush_literal(parts: &mut Vec<QuotedPart>, literal: &mut Vec<u8>) {
    if !literal.is_empty() {
        parts.push(QuotedPart::Text(std::mem::take(literal)));
    }
}

fn scan_braced<'a>(
    start: SourceCursor<'a>,
    text: &str,
) -> Result<(String, SourceCursor<'a>), EvalError> {
    let mut cursor = start;
    let mut depth = 1usize;
    while let Some((byte, next)) = cursor.step() {
        match byte {
            b'\\' => {
                cursor = next.advance(1).unwrap_or(next);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let value = start.slice_until(cursor).unwrap_or_default();
                    return Ok((value.to_string(), next));
                }
            }
            _ => {}
        }
        cursor = next;
    }
    Err(syntax_error(text, "missing close-brace"))
}

fn scan_word<'a>(
    start: SourceCursor<'a>,
    text: &str,
) -> Result<(ExprToken, SourceCursor<'a>), EvalError> {
    let mut cursor = start;
    while let Some((byte, next)) = cursor.step() {
        if !(byte == b'_' || byte.is_ascii_alphanumeric()) {
            break;
        }
        cursor = next;
    }
    let word = start.slice_until(cursor).unwrap_or_default();

    let token = match word {
        "eq" => ExprToken::StrEq,
        "ne" => ExprToken::StrNe,
        "true" | "false" | "yes" | "no" | "on" | "off" => {
            ExprToken::Operand(Operand::Literal(Value::Str(word.to_string())))
        }
        _ if cursor.peek() == Some(b'(') => ExprToken::Func(word.to_string()),
        _ => {
            return Err(syntax_error(
                text,
                &format!("invalid bareword \"{word}\""),
            ));
        }
    };
    Ok((token, cursor))
}
fn scan_operator<'a>(
    cursor: SourceCursor<'a>,
    text: &str,
) -> Result<(ExprToken, SourceCursor<'a>), EvalError> {
    let pair = (cursor.peek(), cursor.peek_at(1));
    let (token, width) = match pair {
        (Some(b'&'), Some(b'&')) => (ExprToken::AmpAmp, 2),
        (Some(b'|'), Some(b'|')) => (ExprToken::PipePipe, 2),
        (Some(b'<'), Some(b'<')) => (ExprToken::ShiftLeft, 2),
        (Some(b'>'), Some(b'>')) => (ExprToken::ShiftRight, 2),
        (Some(b'<'), Some(b'=')) => (ExprToken::LessEqual, 2),
        (Some(b'>'), Some(b'=')) => (ExprToken::GreaterEqual, 2),
        (Some(b'='), Some(b'=')) => (ExprToken::EqualEqual, 2),
        (Some(b'!'), Some(b'=')) => (ExprToken::BangEqual, 2),
        (Some(b'+'), _) => (ExprToken::Plus, 1),
        (Some(b'-'), _) => (ExprToken::Minus, 1),
        (Some(b'*'), _) => (ExprToken::Star, 1),
        (Some(b'/'), _) => (ExprToken::Slash, 1),
        (Some(b'%'), _) => (ExprToken::Percent, 1),
        (Some(b'~'), _) => (ExprToken::Tilde, 1),
        (Some(b'!'), _) => (ExprToken::Bang, 1),
        (Some(b'&'), _) => (ExprToken::Amp, 1),
        (Some(b'|'), _) => (ExprToken::Pipe, 1),
        (Some(b'^'), _) => (ExprToken::Caret, 1),
        (Some(b'<'), _) => (ExprToken::Less, 1),
        (Some(b'>'), _) => (ExprToken::Greater, 1),
        (Some(b'?'), _) => (ExprToken::Question, 1),
        (Some(b':'), _) => (ExprToken::Colon, 1),
        (Some(b','), _) => (ExprToken::Comma, 1),
        (Some(b'('), _) => (ExprToken::LParen, 1),
        (Some(b')'), _) => (ExprToken::RParen, 1),
        _ => {
            let rest = String::from_utf8_lossy(cursor.rest()).into_owned();
            let shown: String = rest.chars().take(1).collect();
            return Err(syntax_error(
                text,
                &format!("unexpected character \"{shown}\""),
            ));
        }
    };
    Ok((token, cursor.advance(width).unwrap_or(cursor)))
}

// ---------------------------------------------------------------------------
// ExprEvaluator
// ---------------------------------------------------------------------------

struct ExprEvaluator<'c, C: ?Sized> {
    tokens: Vec<ExprToken>,
    pos: usize,
    /// Set while consuming an untaken branch: operands resolve to a
    /// placeholder and operators are not applied.
    skipping: bool,
    ctx: &'c mut C,
}

impl<C> ExprEvaluator<'_, C>
where
    C: ExprContext + ?Sized,
{
    fn current(&self) -> &ExprToken {
        self.tokens.get(self.pos).unwrap_or(&ExprToken::Eof)
    }

    fn advance(&mut self) -> ExprToken {
        let token = self
            .tokens
            .get_mut(self.pos)
            .map(|slot| std::mem::replace(slot, ExprToken::Eof))
            .unwrap_or(ExprToken::Eof);
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: &ExprToken) -> Result<(), EvalError> {
        if self.current() == expected {
            self.advance();
            return Ok(());
        }
        Err(EvalError::Expression(format!(
            "syntax error in expression: expected {expected:?}, got {:?}",
            self.current()
        )))
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.ctx.enter_nested()?;
        let result = parse(self);
        self.ctx.leave_nested();
        result
    }

    fn parse_skipping_if(
        &mut self,
        skip: bool,
        parse: fn(&mut Self) -> Result<Value, EvalError>,
    ) -> Result<Value, EvalError> {
        let was_skipping = self.skipping;
        self.skipping |= skip;
        let result = parse(self);
        self.skipping = was_skipping;
        result
    }

    fn apply(
        &self,
        left: Value,
        right: Value,
        op: impl FnOnce(Value, Value) -> Result<Value, EvalError>,
    ) -> Result<Value, EvalError> {
        if self.skipping {
            return Ok(left);
        }
        op(left, right)
    }

    fn parse_ternary(&mut self) -> Result<Value, EvalError> {
        let condition = self.parse_logical_or()?;
        if *self.current() != ExprToken::Question {
            return Ok(condition);
        }
        self.advance();
        let take_then = self.skipping || condition.as_bool()?;
        let then_value =
            self.nested(|this| this.parse_skipping_if(!take_then, Self::parse_ternary))?;
        self.expect(&ExprToken::Colon)?;
        let else_value =
            self.nested(|this| this.parse_skipping_if(take_then, Self::parse_ternary))?;
        Ok(if take_then { then_value } else { else_value })
    }

    fn parse_logical_or(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_logical_and()?;
        while *self.current() == ExprToken::PipePipe {
            self.advance();
            let decided = !self.skipping && left.as_bool()?;
            let right = self.parse_skipping_if(decided, Self::parse_logical_and)?;
            left = self.apply(left, right, |_, right| {
                Ok(Value::from(decided || right.as_bool()?))
            })?;
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_bitwise_or()?;
        while *self.current() == ExprToken::AmpAmp {
            self.advance();
            let decided = !self.skipping && !left.as_bool()?;
            let right = self.parse_skipping_if(decided, Self::parse_bitwise_or)?;
            left = self.apply(left, right, |_, right| {
                Ok(Value::from(!decided && right.as_bool()?))
            })?;
        }
        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_bitwise_xor()?;
        while *self.current() == ExprToken::Pipe {
            self.advance();
            let right = self.parse_bitwise_xor()?;
            left = self.apply(left, right, |a, b| Ok(Value::Int(a.as_int("|")? | b.as_int("|")?)))?;
        }
        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_bitwise_and()?;
        while *self.current() == ExprToken::Caret {
            self.advance();
            let right = self.parse_bitwise_and()?;
            left = self.apply(left, right, |a, b| Ok(Value::Int(a.as_int("^")? ^ b.as_int("^")?)))?;
        }
        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_string_equality()?;
        while *self.current() == ExprToken::Amp {
            self.advance();
            let right = self.parse_string_equality()?;
            left = self.apply(left, right, |a, b| Ok(Value::Int(a.as_int("&")? & b.as_int("&")?)))?;
        }
        Ok(left)
    }

    fn parse_string_equality(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_equality()?;
        loop {
            let negate = match self.current() {
                ExprToken::StrEq => false,
                ExprToken::StrNe => true,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_equality()?;
            left = self.apply(left, right, |a, b| {
                Ok(Value::from((a.to_string() == b.to_string()) != negate))
            })?;
        }
    }

    fn parse_equality(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_relational()?;
        loop {
            let negate = match self.current() {
                ExprToken::EqualEqual => false,
                ExprToken::BangEqual => true,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = self.apply(left, right, |a, b| {
                Ok(Value::from((compare(&a, &b) == Ordering::Equal) != negate))
            })?;
        }
    }

    fn parse_relational(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_shift()?;
        loop {
            let accept: fn(Ordering) -> bool = match self.current() {
                ExprToken::Less => Ordering::is_lt,
                ExprToken::Greater => Ordering::is_gt,
                ExprToken::LessEqual => Ordering::is_le,
                ExprToken::GreaterEqual => Ordering::is_ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_shift()?;
            left = self.apply(left, right, |a, b| Ok(Value::from(accept(compare(&a, &b)))))?;
        }
    }

    fn parse_shift(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current() {
                ExprToken::ShiftLeft => "<<",
                ExprToken::ShiftRight => ">>",
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.apply(left, right, |a, b| shift(op, &a, &b))?;
        }
    }

    fn parse_additive(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                ExprToken::Plus => "+",
                ExprToken::Minus => "-",
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.apply(left, right, |a, b| arithmetic(op, &a, &b))?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Value, EvalError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                ExprToken::Star => "*",
                ExprToken::Slash => "/",
                ExprToken::Percent => "%",
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.apply(left, right, |a, b| arithmetic(op, &a, &b))?;
        }
    }

    fn parse_unary(&mut self) -> Result<Value, EvalError> {
        let op = match self.current() {
            ExprToken::Minus => b'-',
            ExprToken::Plus => b'+',
            ExprToken::Bang => b'!',
            ExprToken::Tilde => b'~',
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?;
        if self.skipping {
            return Ok(operand);
        }
        match (op, operand) {
            (b'-', Value::Int(value)) => value
                .checked_neg()
                .map(Value::Int)
                .ok_or(EvalError::IntegerOverflow),
            (b'-', other) => Ok(Value::Double(-other.as_double("-")?)),
            (b'+', value) => {
                value.as_double("+")?;
                Ok(value)
            }
            (b'!', value) => Ok(Value::from(!value.as_bool()?)),
            (_, value) => Ok(Value::Int(!value.as_int("~")?)),
        }
    }

    fn parse_primary(&mut self) -> Result<Value, EvalError> {
        match self.advance() {
            ExprToken::Operand(operand) => self.resolve(operand),
            ExprToken::LParen => self.nested(|this| {
                let value = this.parse_ternary()?;
                this.expect(&ExprToken::RParen)?;
                Ok(value)
            }),
            ExprToken::Func(name) => {
                let args = self.nested(Self::parse_arguments)?;
                if self.skipping {
                    return Ok(Value::Int(0));
                }
                call_function(&name, args)
            }
            other => Err(EvalError::Expression(format!(
                "syntax error in expression: unexpected {other:?}"
            ))),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Value>, EvalError> {
        self.expect(&ExprToken::LParen)?;
        let mut args = Vec::new();
        if *self.current() != ExprToken::RParen {
            args.push(self.parse_ternary()?);
            while *self.current() == ExprToken::Comma {
                self.advance();
                args.push(self.parse_ternary()?);
            }
        }
        self.expect(&ExprToken::RParen)?;
        Ok(args)
    }

    fn resolve(&mut self, operand: Operand) -> Result<Value, EvalError> {
        if self.skipping {
            return Ok(Value::Int(0));
        }
        match operand {
            Operand::Literal(value) => Ok(value),
            Operand::Variable(name) => Ok(Value::from_text(&self.ctx.variable(&name)?)),
            Operand::Command(script) => Ok(Value::from_text(&self.ctx.run_command(script)?)),
            Operand::Quoted(parts) => {
                let mut bytes = Vec::new();
                for part in parts {
                    match part {
                        QuotedPart::Text(text) => bytes.extend_from_slice(&text),
                        QuotedPart::Variable(name) => {
                            bytes.extend_from_slice(self.ctx.variable(&name)?.as_bytes());
                        }
                        QuotedPart::Command(script) => {
                            bytes.extend_from_slice(self.ctx.run_command(script)?.as_bytes());
                        }
                    }
                }
                Ok(Value::Str(String::from_utf8_lossy(&bytes).into_owned()))
            }
        }
    }
}

fn shift(op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (value, amount) = (left.as_int(op)?, right.as_int(op)?);
    let amount = u32::try_from(amount)
        .map_err(|_| EvalError::Expression("negative shift argument".to_string()))?;
    Ok(Value::Int(if op == "<<" {
        value.checked_shl(amount).ok_or(EvalError::IntegerOverflow)?
    } else {
        value >> amount.min(63)
    }))
}

fn compare(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (a, b) if a.is_numeric() && b.is_numeric() => {
            let (a, b) = (a.as_double("<").unwrap_or(0.0), b.as_double("<").unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

fn arithmetic(op: &str, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let (a, b) = (*a, *b);
        let result = match op {
            "+" => a.checked_add(b),
            "-" => a.checked_sub(b),
            "*" => a.checked_mul(b),
            "/" | "%" if b == 0 => return Err(EvalError::DivideByZero),
            "/" => floor_div(a, b),
            _ => a.checked_rem(b).map(|rem| {
                if rem != 0 && (rem < 0) != (b < 0) {
                    rem + b
                } else {
                    rem
                }
            }),
        };
        return result.map(Value::Int).ok_or(EvalError::IntegerOverflow);
    }

    if op == "%" {
        left.as_int(op)?;
        right.as_int(op)?;
    }
    let (a, b) = (left.as_double(op)?, right.as_double(op)?);
    Ok(Value::Double(match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        _ if b == 0.0 => return Err(EvalError::DivideByZero),
        _ => a / b,
    }))
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

fn call_function(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    let arity_error = || {
        EvalError::Expression(format!(
            "wrong # args for math function \"{name}\""
        ))
    };
    match name {
        "abs" => match args.as_slice() {
            [Value::Int(value)] => value
                .checked_abs()
                .map(Value::Int)
                .ok_or(EvalError::IntegerOverflow),
            [other] => Ok(Value::Double(other.as_double("abs")?.abs())),
            _ => Err(arity_error()),
        },
        "int" => match args.as_slice() {
            [Value::Int(value)] => Ok(Value::Int(*value)),
            [other] => Ok(Value::Int(other.as_double("int")?.trunc() as i64)),
            _ => Err(arity_error()),
        },
        "double" => match args.as_slice() {
            [value] => Ok(Value::Double(value.as_double("double")?)),
            _ => Err(arity_error()),
        },
        "min" | "max" => {
            let mut values = args.into_iter();
            let mut best = values.next().ok_or_else(arity_error)?;
            best.as_double(name)?;
            for value in values {
                value.as_double(name)?;
                let ordering = compare(&value, &best);
                let better = if name == "min" {
                    ordering.is_lt()
                } else {
                    ordering.is_gt()
                };
                if better {
                    best = value;
                }
            }
            Ok(best)
        }
        _ => Err(EvalError::Expression(format!(
            "invalid math function \"{name}\""
        ))),
    }
}
