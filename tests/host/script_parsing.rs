use exprsub::lexer::{ByteOffset, DiagnosticCode, NeedMoreReason, SourceCursor, SourceId};
use exprsub::parser::{ParseError, ParseOptions, Parser, Script, WordPart};
use pretty_assertions::assert_eq;

fn parse(input: &str) -> Script {
    Parser::new(ParseOptions::default())
        .parse_script(SourceCursor::new(input))
        .unwrap_or_else(|error| panic!("`{input}` failed: {error}"))
}

fn literals(script: &Script) -> Vec<Vec<Option<String>>> {
    script
        .commands
        .iter()
        .map(|command| {
            command
                .words
                .iter()
                .map(|word| word.literal().map(str::to_string))
                .collect()
        })
        .collect()
}

#[test]
fn commands_split_on_newlines_and_semicolons() {
    let script = parse("set a 1; set b 2\n\nset c {x y}\n");
    assert_eq!(
        literals(&script),
        vec![
            vec![Some("set".into()), Some("a".into()), Some("1".into())],
            vec![Some("set".into()), Some("b".into()), Some("2".into())],
            vec![Some("set".into()), Some("c".into()), Some("x y".into())],
        ]
    );
}

#[test]
fn empty_script_has_no_commands() {
    assert!(parse("  ;\n ; ").is_empty());
}

#[test]
fn expression_word_span_covers_marker_through_terminator() {
    let script = parse("set r $(1+2*3) tail");
    let word = &script.commands[0].words[2];
    assert_eq!(word.span.start, ByteOffset::new(6));
    assert_eq!(word.span.end, ByteOffset::new(14));
    match word.parts.as_slice() {
        [WordPart::ExprSubstitution(token)] => {
            assert_eq!(token.span.start, ByteOffset::new(7));
            assert_eq!(token.span.end, word.span.end);
        }
        other => panic!("unexpected parts: {other:?}"),
    }
    assert_eq!(script.commands[0].words[3].literal(), Some("tail"));
}

#[test]
fn variables_and_literal_dollars() {
    let script = parse("puts $name ${other} $ a$");
    let parts: Vec<_> = script.commands[0].words[1..]
        .iter()
        .map(|word| &word.parts)
        .collect();
    assert_eq!(parts[0], &vec![WordPart::Variable("name".into())]);
    assert_eq!(parts[1], &vec![WordPart::Variable("other".into())]);
    assert_eq!(parts[2], &vec![WordPart::Text("$".into())]);
    assert_eq!(parts[3], &vec![WordPart::Text("a$".into())]);
}

#[test]
fn escapes_and_line_continuations() {
    let script = parse("set a x\\ty \\\n    b");
    assert_eq!(script.commands.len(), 1);
    assert_eq!(script.commands[0].words[2].literal(), Some("x\ty"));
    assert_eq!(script.commands[0].words[3].literal(), Some("b"));
}

#[test]
fn spans_use_the_configured_source() {
    let parser = Parser::new(ParseOptions {
        source_id: SourceId::new(7),
        ..Default::default()
    });
    let script = parser
        .parse_script(SourceCursor::new("set r $(1)"))
        .expect("parses");
    let command = &script.commands[0];
    assert_eq!(command.span.source_id, SourceId::new(7));
    match &command.words[2].parts[..] {
        [WordPart::ExprSubstitution(token)] => {
            assert_eq!(token.span.source_id, SourceId::new(7));
        }
        other => panic!("unexpected parts: {other:?}"),
    }
}

#[test]
fn unbalanced_host_constructs_are_syntax_errors() {
    let cases = [
        ("set a {x", DiagnosticCode::MissingCloseBrace),
        ("set a \"x", DiagnosticCode::MissingCloseQuote),
        ("set a [x", DiagnosticCode::MissingCloseBracket),
        ("set a ${x", DiagnosticCode::MissingCloseVariableBrace),
        ("set a {x}y", DiagnosticCode::ExtraCharactersAfterCloseBrace),
        ("set a \"x\"y", DiagnosticCode::ExtraCharactersAfterCloseQuote),
    ];
    for (input, code) in cases {
        let error = Parser::new(ParseOptions::default())
            .parse_script(SourceCursor::new(input))
            .expect_err(input);
        match error {
            ParseError::Syntax(diagnostic) => assert_eq!(diagnostic.code, code, "{input}"),
            other => panic!("{input}: unexpected error {other:?}"),
        }
    }
}

#[test]
fn unbalanced_host_constructs_are_incomplete_when_interactive() {
    let cases = [
        ("set a {x", NeedMoreReason::UnterminatedBrace),
        ("set a \"x", NeedMoreReason::UnterminatedQuote),
        ("set a [x", NeedMoreReason::UnterminatedBracket),
    ];
    for (input, reason) in cases {
        let error = Parser::new(ParseOptions::default())
            .parse_script(SourceCursor::interactive(input))
            .expect_err(input);
        match error {
            ParseError::Incomplete(need) => {
                assert_eq!(need.reason, reason, "{input}");
                assert_eq!(need.checkpoint, ByteOffset::new(6), "{input}");
            }
            other => panic!("{input}: unexpected error {other:?}"),
        }
    }
}
