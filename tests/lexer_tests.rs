use ugo_rust::lexer::{lex, tokenize, LexerError, Pos, Position, TokenKind};

fn kinds(src: &str) -> Vec<TokenKind> {
    lex("test.ugo", src).0.iter().map(|tok| tok.kind).collect()
}

/// Source text that lexes to exactly one token of `kind`.
fn canonical(kind: TokenKind) -> Option<String> {
    match kind {
        TokenKind::Eof | TokenKind::Error | TokenKind::Comment => None,
        TokenKind::Ident => Some("name".to_string()),
        TokenKind::Number => Some("42".to_string()),
        TokenKind::String => Some("\"ugo\"".to_string()),
        _ => Some(kind.to_string()),
    }
}

#[test]
fn test_every_kind_round_trips() {
    for kind in TokenKind::ALL {
        let Some(src) = canonical(kind) else {
            continue;
        };
        let (tokens, comments) = lex("test.ugo", &src);
        assert_eq!(tokens.len(), 2, "{src:?} gave {tokens:?}");
        assert_eq!(tokens[0].kind, kind, "lexing {src:?}");
        assert_eq!(tokens[0].pos, Pos(0));
        assert_eq!(tokens[0].lexeme, src);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
        assert!(comments.is_empty());
    }
}

#[test]
fn test_keywords_are_not_identifiers() {
    for kind in TokenKind::ALL.into_iter().filter(|k| k.is_keyword()) {
        assert_eq!(TokenKind::lookup(&kind.to_string()), kind);
    }
    assert_eq!(TokenKind::lookup("packages"), TokenKind::Ident);
    assert_eq!(kinds("fortune"), vec![TokenKind::Ident, TokenKind::Eof]);
}

#[test]
fn test_semicolon_after_identifier() {
    let (tokens, _) = lex("test.ugo", "x\n");
    let got: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        got,
        vec![TokenKind::Ident, TokenKind::Semicolon, TokenKind::Eof]
    );
    assert_eq!(tokens[0].lexeme, "x");
}

#[test]
fn test_no_semicolon_after_operator() {
    assert_eq!(kinds("+\n"), vec![TokenKind::Add, TokenKind::Eof]);
    assert_eq!(kinds("x :=\n1"), vec![
        TokenKind::Ident,
        TokenKind::Define,
        TokenKind::Number,
        TokenKind::Eof,
    ]);
}

#[test]
fn test_semicolon_insertion_table() {
    for src in ["7\n", "\"s\"\n", "f()\n", "{}\n", "return\n"] {
        let got = kinds(src);
        assert_eq!(
            got[got.len() - 2],
            TokenKind::Semicolon,
            "expected inserted semicolon for {src:?}, got {got:?}"
        );
    }
    for src in ["(\n", "{\n", ",\n", "if\n", "==\n", "&&\n"] {
        assert!(
            !kinds(src).contains(&TokenKind::Semicolon),
            "unexpected semicolon for {src:?}"
        );
    }
}

#[test]
fn test_blank_lines_insert_one_semicolon() {
    assert_eq!(kinds("x\n\n\n"), vec![
        TokenKind::Ident,
        TokenKind::Semicolon,
        TokenKind::Eof,
    ]);
}

#[test]
fn test_comments_use_their_own_channel() {
    let (tokens, comments) = lex("test.ugo", "x // note\ny");
    let got: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(got, vec![
        TokenKind::Ident,
        TokenKind::Semicolon,
        TokenKind::Ident,
        TokenKind::Eof,
    ]);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].kind, TokenKind::Comment);
    assert_eq!(comments[0].lexeme, "// note");
    assert_eq!(comments[0].pos, Pos(2));
}

#[test]
fn test_comment_does_not_trigger_semicolon() {
    assert_eq!(kinds("+ // x\n"), vec![TokenKind::Add, TokenKind::Eof]);
}

#[test]
fn test_two_character_operators() {
    assert_eq!(kinds("a<=b"), vec![
        TokenKind::Ident,
        TokenKind::Leq,
        TokenKind::Ident,
        TokenKind::Eof,
    ]);
    assert_eq!(kinds("x+=1"), vec![
        TokenKind::Ident,
        TokenKind::AddAssign,
        TokenKind::Number,
        TokenKind::Eof,
    ]);
    assert_eq!(kinds("a||b&&c"), vec![
        TokenKind::Ident,
        TokenKind::LogicalOr,
        TokenKind::Ident,
        TokenKind::LogicalAnd,
        TokenKind::Ident,
        TokenKind::Eof,
    ]);
}

#[test]
fn test_float_literal_is_one_number() {
    let (tokens, _) = lex("test.ugo", "3.25");
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].lexeme, "3.25");
}

#[test]
fn test_string_literal_value() {
    let (tokens, _) = lex("test.ugo", r#""a\tb\"c""#);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].string_value(), "a\tb\"c");
}

#[test]
fn test_unrecognized_character_stops_lexing() {
    let (tokens, _) = lex("test.ugo", "x @ y");
    let got: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(got, vec![TokenKind::Ident, TokenKind::Error, TokenKind::Eof]);
    assert_eq!(tokens[1].pos, Pos(2));
    assert!(tokens[1].lexeme.contains("U+0040"));
}

#[test]
fn test_lone_bang_and_colon_are_errors() {
    assert_eq!(kinds("!"), vec![TokenKind::Error, TokenKind::Eof]);
    assert_eq!(kinds("a : b"), vec![
        TokenKind::Ident,
        TokenKind::Error,
        TokenKind::Eof,
    ]);
    assert_eq!(kinds("a & b"), vec![
        TokenKind::Ident,
        TokenKind::Error,
        TokenKind::Eof,
    ]);
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("s.ugo", "\"abc\n").unwrap_err();
    let LexerError::Illegal(message, position) = err;
    assert!(message.contains("unterminated"));
    assert_eq!(position, Position::new("s.ugo", 1, 1));
}

#[test]
fn test_tokenize_reports_position() {
    let err = tokenize("t.ugo", "x := 1\ny := $").unwrap_err();
    assert_eq!(
        err.to_string(),
        "t.ugo:2:6: invalid token: unrecognized character: U+0024 '$'"
    );
}

#[test]
fn test_position_display() {
    assert_eq!(Position::new("a.ugo", 3, 7).to_string(), "a.ugo:3:7");
    assert_eq!(Position::new("a.ugo", 3, 0).to_string(), "a.ugo:3");
    assert_eq!(Position::new("", 3, 7).to_string(), "3:7");
    assert_eq!(Position::new("a.ugo", 0, 0).to_string(), "a.ugo");
    assert_eq!(Position::unknown().to_string(), "-");
}

#[test]
fn test_pos_to_position() {
    let src = "ab\ncd\nef";
    assert_eq!(Pos(0).position("f", src), Position::new("f", 1, 1));
    assert_eq!(Pos(4).position("f", src), Position::new("f", 2, 2));
    assert_eq!(Pos(6).position("f", src), Position::new("f", 3, 1));
}
