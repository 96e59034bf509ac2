use exprsub::interp::{EvalError, Interp};
use exprsub::lexer::{
    ByteOffset, DiagnosticCode, RecognitionErrorKind, RecognitionMode, RecognitionResult,
    Recognizer, RecognizerConfig, RecognizerLimits, SourceCursor, MAX_EXPRESSION_BYTES,
    MAX_NESTING_DEPTH,
};
use exprsub::parser::{ParseError, ParseOptions, Parser};
use pretty_assertions::assert_eq;

use crate::support::{after_marker, AcceptAll};

fn limited(max_nesting_depth: u16, max_expression_bytes: usize) -> RecognizerConfig {
    RecognizerConfig {
        mode: RecognitionMode::SinglePrefix,
        limits: RecognizerLimits {
            max_nesting_depth,
            max_expression_bytes,
        },
    }
}

#[test]
fn default_limits() {
    let limits = RecognizerLimits::default();
    assert_eq!(limits.max_nesting_depth, MAX_NESTING_DEPTH);
    assert_eq!(limits.max_nesting_depth, 64);
    assert_eq!(limits.max_expression_bytes, MAX_EXPRESSION_BYTES);
}

#[test]
fn recognition_beyond_depth_limit_is_an_error() {
    let recognizer = Recognizer::new(limited(2, MAX_EXPRESSION_BYTES));
    let cursor = after_marker("$(1)");

    assert!(matches!(
        recognizer.recognize_nested(cursor, 2, &AcceptAll),
        RecognitionResult::Token(_)
    ));

    let error = recognizer
        .recognize_nested(cursor, 3, &AcceptAll)
        .error()
        .expect("too deep");
    assert_eq!(error.kind, RecognitionErrorKind::NestingDepthExceeded);
    assert_eq!(error.diagnostic.code, DiagnosticCode::NestingDepthExceeded);
    assert_eq!(error.offset(), ByteOffset::new(1));
    assert_eq!(
        error.message(),
        "expression substitution nesting depth 3 exceeded limit 2"
    );
}

#[test]
fn oversized_body_is_an_error() {
    let recognizer = Recognizer::new(limited(MAX_NESTING_DEPTH, 4));
    assert!(matches!(
        recognizer.recognize(after_marker("$(1234)"), &AcceptAll),
        RecognitionResult::Token(_)
    ));

    let error = recognizer
        .recognize(after_marker("$(12345)"), &AcceptAll)
        .error()
        .expect("too long");
    assert_eq!(error.kind, RecognitionErrorKind::ExpressionSizeLimitExceeded);
    assert_eq!(
        error.message(),
        "expression substitution exceeded configured limit (4 bytes)"
    );
    assert!(!error.is_fatal());
}

#[test]
fn parser_bounds_command_substitution_depth() {
    let parser = Parser::new(ParseOptions {
        recognizer: limited(2, MAX_EXPRESSION_BYTES),
        ..Default::default()
    });

    assert!(parser.parse_script(SourceCursor::new("set r [a [b]]")).is_ok());

    let error = parser
        .parse_script(SourceCursor::new("set r [a [b [c]]]"))
        .expect_err("too deep");
    match error {
        ParseError::Syntax(diagnostic) => {
            assert_eq!(diagnostic.code, DiagnosticCode::NestingDepthExceeded);
            assert_eq!(diagnostic.span.start, ByteOffset::new(12));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn evaluation_bounds_nested_substitutions() {
    let script = "set r $(1 + [expr $(2)])";

    let mut shallow = Interp::new(limited(2, MAX_EXPRESSION_BYTES));
    assert_eq!(shallow.eval(script), Err(EvalError::NestingTooDeep(2)));

    let mut deep_enough = Interp::new(limited(3, MAX_EXPRESSION_BYTES));
    assert_eq!(deep_enough.eval(script), Ok("3".to_string()));
}

#[test]
fn adversarial_nesting_fails_cleanly() {
    let nest = |depth: usize| {
        format!(
            "set r {}1{}",
            "$(1 + [expr ".repeat(depth),
            "])".repeat(depth)
        )
    };
    let mut interp = Interp::new(limited(8, MAX_EXPRESSION_BYTES));
    assert_eq!(interp.eval(&nest(2)), Ok("3".to_string()));
    assert!(interp.eval(&nest(32)).is_err());
}

#[test]
fn deeply_parenthesized_expression_is_an_error() {
    let mut interp = Interp::default();

    let parens = |depth: usize| {
        format!("set r $({}1{})", "(".repeat(depth), ")".repeat(depth))
    };
    assert_eq!(interp.eval(&parens(50)), Ok("1".to_string()));
    assert_eq!(
        interp.eval(&parens(10_000)),
        Err(EvalError::NestingTooDeep(MAX_NESTING_DEPTH))
    );
}

#[test]
fn long_unary_chain_is_an_error() {
    let mut interp = Interp::default();

    assert_eq!(interp.eval("set r $(- - -1)"), Ok("-1".to_string()));
    assert_eq!(
        interp.eval(&format!("set r $({}1)", "-".repeat(50_000))),
        Err(EvalError::NestingTooDeep(MAX_NESTING_DEPTH))
    );
    assert_eq!(
        interp.eval(&format!("set r $({}1)", "!".repeat(50_000))),
        Err(EvalError::NestingTooDeep(MAX_NESTING_DEPTH))
    );
}

#[test]
fn expression_depth_shares_the_evaluation_budget() {
    let mut interp = Interp::new(limited(4, MAX_EXPRESSION_BYTES));

    // Levels: `$(`, then two parens.
    assert_eq!(interp.eval("set r $(((1)))"), Ok("1".to_string()));
    // Levels: `$(`, two parens, `[`, `$(`.
    assert_eq!(
        interp.eval("set r $(((1 + [expr $(1)])))"),
        Err(EvalError::NestingTooDeep(4))
    );
    assert_eq!(interp.eval("set r $(1 + [expr $(1)])"), Ok("2".to_string()));
}
