use proptest::prelude::*;
use ugo_rust::lexer::{lex, TokenKind};

proptest! {
    #[test]
    fn lexing_is_total(src in "\\PC{0,64}") {
        let (tokens, comments) = lex("prop.ugo", &src);

        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

        let errors: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::Error)
            .map(|(i, _)| i)
            .collect();
        prop_assert!(errors.len() <= 1);
        if let Some(&i) = errors.first() {
            prop_assert_eq!(i, tokens.len() - 2);
        }

        for pair in tokens.windows(2) {
            prop_assert!(pair[0].pos <= pair[1].pos, "{:?}", pair);
        }
        prop_assert!(comments.iter().all(|c| c.kind == TokenKind::Comment));
    }

    #[test]
    fn identifiers_lex_to_one_token(name in "[a-z_][a-z0-9_]{0,8}") {
        let expected = TokenKind::lookup(&name);
        let (tokens, _) = lex("prop.ugo", &name);
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].kind, expected);
        prop_assert_eq!(&tokens[0].lexeme, &name);
    }

    #[test]
    fn integers_lex_to_numbers(n in 0u32..) {
        let src = format!("{n}\n");
        let kinds: Vec<_> = lex("prop.ugo", &src).0.iter().map(|t| t.kind).collect();
        prop_assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Semicolon, TokenKind::Eof]);
    }
}
