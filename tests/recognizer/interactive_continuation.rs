use exprsub::lexer::{
    InputCompleteness, NeedMoreReason, RecognitionMode, RecognitionResult, SourceCursor,
};
use exprsub::parser::ParseError;

use crate::support::{after_marker, after_marker_interactive, parser, recognizer, AcceptAll};

fn incomplete_reason(mode: RecognitionMode, input: &str) -> NeedMoreReason {
    match recognizer(mode).recognize(after_marker_interactive(input), &AcceptAll) {
        RecognitionResult::Incomplete(need) => need.reason,
        other => panic!("expected incomplete input for {input}, got {other:?}"),
    }
}

#[test]
fn open_body_asks_for_another_line() {
    assert_eq!(
        incomplete_reason(RecognitionMode::SinglePrefix, "set r $(1 +"),
        NeedMoreReason::UnterminatedExpression
    );
    assert_eq!(
        incomplete_reason(RecognitionMode::DoublePrefix, "$((1+2"),
        NeedMoreReason::UnterminatedExpression
    );
}

#[test]
fn double_prefix_waits_for_second_terminator() {
    assert_eq!(
        incomplete_reason(RecognitionMode::DoublePrefix, "$((1+2)"),
        NeedMoreReason::MissingSecondTerminator
    );
}

#[test]
fn checkpoint_is_the_sigil() {
    let input = "puts $(max(1,";
    let cursor = after_marker_interactive(input);
    match recognizer(RecognitionMode::SinglePrefix).recognize(cursor, &AcceptAll) {
        RecognitionResult::Incomplete(need) => assert_eq!(need.checkpoint, cursor.offset()),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn same_text_in_complete_buffer_is_an_error() {
    let input = "$((1+2";
    let complete = recognizer(RecognitionMode::DoublePrefix).recognize(after_marker(input), &AcceptAll);
    assert!(matches!(complete, RecognitionResult::Error(_)));

    let cursor = after_marker(input).with_completeness(InputCompleteness::Interactive);
    let interactive = recognizer(RecognitionMode::DoublePrefix).recognize(cursor, &AcceptAll);
    assert!(matches!(interactive, RecognitionResult::Incomplete(_)));
}

#[test]
fn appending_the_next_line_completes_the_token() {
    let mode = RecognitionMode::SinglePrefix;
    let first = "set r $(1 +\n";
    assert!(matches!(
        recognizer(mode).recognize(after_marker_interactive(first), &parser(mode)),
        RecognitionResult::Incomplete(_)
    ));

    let joined = format!("{first}2)\n");
    let token = recognizer(mode)
        .recognize(after_marker_interactive(&joined), &parser(mode))
        .token()
        .expect("completed");
    assert_eq!(token.synthetic.text(), "[expr {1 +\n2}]");
}

#[test]
fn parser_propagates_incomplete_input() {
    let parser = parser(RecognitionMode::SinglePrefix);
    let error = parser
        .parse_script(SourceCursor::interactive("set r $(1 + [set x"))
        .expect_err("open construct");
    assert!(error.is_incomplete());
    assert!(matches!(error, ParseError::Incomplete(_)));
}

#[test]
fn parser_reports_unterminated_body_in_complete_buffer() {
    let parser = parser(RecognitionMode::SinglePrefix);
    let error = parser
        .parse_script(SourceCursor::new("set r $(1 + 2"))
        .expect_err("open construct");
    assert!(!error.is_incomplete());
    assert!(matches!(error, ParseError::Recognition(_)));
}
