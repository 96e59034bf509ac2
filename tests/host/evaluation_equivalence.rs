use exprsub::interp::{EvalError, Interp};
use exprsub::lexer::{RecognitionMode, RecognizerConfig};
use pretty_assertions::assert_eq;

fn interp(mode: RecognitionMode) -> Interp {
    Interp::new(RecognizerConfig::new(mode))
}

fn eval(mode: RecognitionMode, script: &str) -> String {
    interp(mode)
        .eval(script)
        .unwrap_or_else(|error| panic!("`{script}` failed: {error}"))
}

#[test]
fn single_prefix_evaluates_like_expr_command() {
    assert_eq!(eval(RecognitionMode::SinglePrefix, "set r $(1+2*3)"), "7");
    assert_eq!(eval(RecognitionMode::SinglePrefix, "set r [expr {1+2*3}]"), "7");
}

#[test]
fn double_prefix_evaluates_like_expr_command() {
    assert_eq!(eval(RecognitionMode::DoublePrefix, "set r $((2+3))"), "5");
}

#[test]
fn tagged_prefix_evaluates_like_expr_command() {
    let mode = RecognitionMode::tagged('=').expect("valid tag");
    assert_eq!(eval(mode, "set r $=(1+2)"), "3");
}

#[test]
fn inactive_trigger_is_literal_text() {
    let mode = RecognitionMode::tagged('=').expect("valid tag");
    assert_eq!(eval(mode, "set r $(1+2)"), "$(1+2)");
    assert_eq!(eval(RecognitionMode::SinglePrefix, "set r $=(1+2)"), "$=(1+2)");
}

#[test]
fn substitution_matches_manual_rewrite_in_every_mode() {
    let bodies = [
        "1+2*3",
        "(4 - 1) * 2",
        "max(3, 9) % 4",
        "7 / 2",
        "7.0 / 2",
        "-7 / 2",
        "1 << 4 | 1",
        "3 > 2 ? \"yes\" : \"no\"",
        "\"a)b\" eq \"a)b\"",
        "!0 && 1",
        "abs(-3) + int(2.9)",
    ];
    let modes = [
        RecognitionMode::SinglePrefix,
        RecognitionMode::TaggedPrefix { tag: b'=' },
        RecognitionMode::DoublePrefix,
    ];

    for mode in modes {
        for body in bodies {
            let (open, close) = match mode {
                RecognitionMode::SinglePrefix => ("$(".to_string(), ")"),
                RecognitionMode::TaggedPrefix { tag } => (format!("${}(", char::from(tag)), ")"),
                RecognitionMode::DoublePrefix => ("$((".to_string(), "))"),
            };
            let substituted = eval(mode, &format!("set r {open}{body}{close}"));
            let manual = eval(mode, &format!("set r [expr {{{body}}}]"));
            assert_eq!(substituted, manual, "{mode}: {body}");
        }
    }
}

#[test]
fn variables_are_substituted_by_the_evaluator() {
    let mut interp = interp(RecognitionMode::SinglePrefix);
    interp.set_var("x", "4");
    assert_eq!(interp.eval("set r $($x * $x + 1)"), Ok("17".to_string()));
    assert_eq!(interp.var("r"), Some("17"));
}

#[test]
fn substitution_joins_surrounding_text() {
    assert_eq!(eval(RecognitionMode::SinglePrefix, "set r $(1+2)x"), "3x");
    assert_eq!(eval(RecognitionMode::SinglePrefix, "set r \"n=$(2*5).\""), "n=10.");
    assert_eq!(eval(RecognitionMode::SinglePrefix, "set r {$(1+2)}"), "$(1+2)");
}

#[test]
fn string_comparison_with_stray_parens() {
    assert_eq!(
        eval(RecognitionMode::SinglePrefix, r#"set r $("a)b" eq "a)b")"#),
        "1"
    );
}

#[test]
fn evaluation_errors_are_reported_not_panicked() {
    let mut interp = interp(RecognitionMode::SinglePrefix);
    assert_eq!(interp.eval("set r $(1/0)"), Err(EvalError::DivideByZero));
    assert!(matches!(interp.eval("set r $(1 +)"), Err(EvalError::Expression(_))));
    assert!(matches!(interp.eval("set r $(1}{)"), Err(EvalError::Parse(_))));
}

#[test]
fn guarded_division_short_circuits() {
    let mut interp = interp(RecognitionMode::SinglePrefix);
    interp.set_var("x", "0");
    assert_eq!(interp.eval("set r $($x == 0 ? 0 : 10/$x)"), Ok("0".to_string()));
    assert_eq!(interp.eval("set r $($x != 0 && 10/$x > 1)"), Ok("0".to_string()));
    assert_eq!(interp.eval("set r $($x == 0 || 10/$x > 1)"), Ok("1".to_string()));

    interp.set_var("x", "5");
    assert_eq!(interp.eval("set r $($x == 0 ? 0 : 10/$x)"), Ok("2".to_string()));
    assert_eq!(interp.eval("set r $($x != 0 && 10/$x > 1)"), Ok("1".to_string()));
}

#[test]
fn untaken_operand_runs_no_command_substitution() {
    let mut interp = interp(RecognitionMode::SinglePrefix);
    interp.set_var("n", "5");

    assert_eq!(interp.eval("set r $(0 && [incr n])"), Ok("0".to_string()));
    assert_eq!(interp.eval("set r $(1 || [incr n])"), Ok("1".to_string()));
    assert_eq!(interp.eval("set r $(1 ? 2 : [incr n])"), Ok("2".to_string()));
    assert_eq!(interp.eval("set r $(0 ? \"[incr n]\" : 3)"), Ok("3".to_string()));
    assert_eq!(interp.var("n"), Some("5"));

    assert_eq!(interp.eval("set r $(1 && [incr n])"), Ok("1".to_string()));
    assert_eq!(interp.var("n"), Some("6"));
}

#[test]
fn escaped_multibyte_character_stays_in_body() {
    assert_eq!(
        eval(RecognitionMode::SinglePrefix, "set r $(\"\\é\" eq \"é\")"),
        "1"
    );
}
