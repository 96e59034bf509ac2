use exprsub::lexer::{
    ConfigError, NeedMoreReason, RecognitionMode, RecognitionResult, DEFAULT_TAG,
};

use crate::support::{after_marker_interactive, recognize, recognizer, AcceptAll};

#[test]
fn each_mode_has_fixed_widths() {
    let cases = [
        (RecognitionMode::SinglePrefix, 1, 1),
        (RecognitionMode::TaggedPrefix { tag: DEFAULT_TAG }, 2, 1),
        (RecognitionMode::DoublePrefix, 2, 2),
    ];
    for (mode, trigger, terminator) in cases {
        assert_eq!(mode.trigger_width(), trigger, "{mode}");
        assert_eq!(mode.terminator_width(), terminator, "{mode}");
    }
}

#[test]
fn default_mode_is_single_prefix() {
    assert_eq!(RecognitionMode::default(), RecognitionMode::SinglePrefix);
    assert_eq!(
        exprsub::lexer::Recognizer::default().config().mode,
        RecognitionMode::SinglePrefix
    );
}

#[test]
fn modes_parse_from_configuration_names() {
    assert_eq!("single".parse::<RecognitionMode>(), Ok(RecognitionMode::SinglePrefix));
    assert_eq!(" double ".parse::<RecognitionMode>(), Ok(RecognitionMode::DoublePrefix));
    assert_eq!(
        "tagged:@".parse::<RecognitionMode>(),
        Ok(RecognitionMode::TaggedPrefix { tag: b'@' })
    );
    assert_eq!(
        "tagged:(".parse::<RecognitionMode>(),
        Err(ConfigError::InvalidTag('('))
    );
    assert_eq!(
        "triple".parse::<RecognitionMode>(),
        Err(ConfigError::UnknownMode("triple".to_string()))
    );
}

#[test]
fn tagged_mode_ignores_untagged_trigger() {
    let mode = RecognitionMode::tagged('=').expect("valid tag");
    assert_eq!(recognize(mode, "$(1+2)"), RecognitionResult::NotApplicable);
}

#[test]
fn single_mode_ignores_tagged_trigger() {
    assert_eq!(
        recognize(RecognitionMode::SinglePrefix, "$=(1+2)"),
        RecognitionResult::NotApplicable
    );
}

#[test]
fn double_mode_requires_both_opening_parens() {
    assert_eq!(
        recognize(RecognitionMode::DoublePrefix, "$(1+2)"),
        RecognitionResult::NotApplicable
    );
}

#[test]
fn other_dollar_forms_are_not_applicable() {
    for input in ["$x", "${name}", "$", "$ (1)", "$[set a]"] {
        for mode in [
            RecognitionMode::SinglePrefix,
            RecognitionMode::TaggedPrefix { tag: DEFAULT_TAG },
            RecognitionMode::DoublePrefix,
        ] {
            assert_eq!(
                recognize(mode, input),
                RecognitionResult::NotApplicable,
                "{mode} {input}"
            );
        }
    }
}

#[test]
fn truncated_tagged_trigger_asks_for_more_input() {
    let mode = RecognitionMode::tagged('=').expect("valid tag");
    let cursor = after_marker_interactive("set r $=");
    match recognizer(mode).recognize(cursor, &AcceptAll) {
        RecognitionResult::Incomplete(need) => {
            assert_eq!(need.reason, NeedMoreReason::TruncatedTrigger);
            assert_eq!(need.checkpoint, cursor.offset());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn truncated_trigger_in_complete_buffer_is_literal() {
    let mode = RecognitionMode::tagged('=').expect("valid tag");
    assert_eq!(recognize(mode, "set r $="), RecognitionResult::NotApplicable);
}

#[test]
fn mode_specific_error_text() {
    assert_eq!(
        RecognitionMode::SinglePrefix.unterminated_message(),
        "missing close-paren in $(...) expression substitution"
    );
    assert_eq!(
        RecognitionMode::TaggedPrefix { tag: b'=' }.unterminated_message(),
        "missing close-paren in $=(...) expression substitution"
    );
    assert_eq!(
        RecognitionMode::DoublePrefix.unterminated_message(),
        "missing close-paren pair in $((...)) expression substitution"
    );
    assert_eq!(
        RecognitionMode::DoublePrefix.missing_second_terminator_message(),
        "missing second close-paren in $((...)) expression substitution"
    );
}
