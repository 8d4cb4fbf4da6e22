use crate::lexer::{Pos, Token, TokenKind};
use log::trace;

/// Cursor over a lexed token sequence with one token of pushback.
///
/// Reading past the end keeps yielding `EOF` at the position of the last token.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    /// Tokens consumed by the last `read`; 0 after an `unread`.
    width: usize,
}

impl TokenStream {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            width: 0,
        }
    }

    /// Look at the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(tok) => tok.clone(),
            None => self.eof(),
        }
    }

    #[must_use]
    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos)
            .map_or(TokenKind::Eof, |tok| tok.kind)
    }

    /// Consume and return the next token.
    pub fn read(&mut self) -> Token {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                let tok = tok.clone();
                self.pos += 1;
                self.width = 1;
                trace!("read {tok}");
                tok
            }
            None => {
                self.width = 0;
                self.eof()
            }
        }
    }

    /// Step back over the token returned by the last `read`.
    ///
    /// A second `unread` without an intervening `read` does nothing.
    pub fn unread(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    /// Consume the next token if its kind is one of `kinds`.
    pub fn accept(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.peek_kind()) {
            Some(self.read())
        } else {
            None
        }
    }

    /// Consume consecutive tokens while their kind is one of `kinds`.
    pub fn accept_run(&mut self, kinds: &[TokenKind]) -> usize {
        let mut count = 0;
        while self.accept(kinds).is_some() {
            count += 1;
        }
        count
    }

    /// Like [`TokenStream::accept`], but a mismatch hands back the offending token.
    ///
    /// # Errors
    /// The peeked token when its kind is not in `kinds`; nothing is consumed.
    pub fn must_accept(&mut self, kinds: &[TokenKind]) -> Result<Token, Token> {
        self.accept(kinds).ok_or_else(|| self.peek())
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn eof(&self) -> Token {
        let pos = self.tokens.last().map_or(Pos::default(), |tok| tok.pos);
        Token::new(TokenKind::Eof, pos, "")
    }
}
