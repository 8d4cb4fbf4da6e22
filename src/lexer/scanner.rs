use crate::lexer::{LexerError, Pos, Token, TokenKind};
use log::{debug, trace};

pub struct Scanner<'src> {
    name: String,
    input: &'src str,
    /// Start of the pending lexeme.
    start: usize,
    /// Read cursor.
    current: usize,
    /// Byte width of the last rune read, for a single `backup`.
    width: usize,
    tokens: Vec<Token>,
    comments: Vec<Token>,
}

impl<'src> Scanner<'src> {
    pub fn new(name: impl Into<String>, input: &'src str) -> Self {
        Self {
            name: name.into(),
            input,
            start: 0,
            current: 0,
            width: 0,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Scan the whole input. Always terminates the token channel with a single `EOF`;
    /// on an unrecognized character the `ERROR` token directly precedes it.
    pub fn scan_all(mut self) -> (Vec<Token>, Vec<Token>) {
        while let Some(ch) = self.next() {
            if !self.scan_rune(ch) {
                break;
            }
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, Pos(self.current), String::new()));

        debug!(
            "lexed {}: {} tokens, {} comments",
            self.name,
            self.tokens.len(),
            self.comments.len()
        );
        (self.tokens, self.comments)
    }

    /// Returns false once an error token has been emitted.
    fn scan_rune(&mut self, ch: char) -> bool {
        match ch {
            '\n' => {
                self.ignore();
                if self.last_kind().is_some_and(TokenKind::ends_statement) {
                    let pos = Pos(self.current - 1);
                    self.tokens.push(Token::new(TokenKind::Semicolon, pos, "\n"));
                }
            }
            ' ' | '\t' | '\r' => self.ignore(),

            ch if is_ident_start(ch) => {
                while self.next().is_some_and(is_ident_continue) {}
                self.backup();
                self.emit(TokenKind::Ident);
            }

            '0'..='9' => self.scan_number(),
            '"' => return self.scan_string(),

            '+' => self.emit_either('=', TokenKind::AddAssign, TokenKind::Add),
            '-' => self.emit_either('=', TokenKind::SubAssign, TokenKind::Sub),
            '*' => self.emit_either('=', TokenKind::MulAssign, TokenKind::Mul),
            '%' => self.emit_either('=', TokenKind::ModAssign, TokenKind::Mod),
            '/' => {
                if self.accept('/') {
                    self.scan_line_comment();
                } else {
                    self.emit_either('=', TokenKind::DivAssign, TokenKind::Div);
                }
            }
            '=' => self.emit_either('=', TokenKind::Eql, TokenKind::Assign),
            '<' => self.emit_either('=', TokenKind::Leq, TokenKind::Lss),
            '>' => self.emit_either('=', TokenKind::Geq, TokenKind::Gtr),
            '!' => return self.emit_pair('=', TokenKind::Neq, ch),
            ':' => return self.emit_pair('=', TokenKind::Define, ch),
            '&' => return self.emit_pair('&', TokenKind::LogicalAnd, ch),
            '|' => return self.emit_pair('|', TokenKind::LogicalOr, ch),

            '(' => self.emit(TokenKind::LParen),
            ')' => self.emit(TokenKind::RParen),
            '{' => self.emit(TokenKind::LBrace),
            '}' => self.emit(TokenKind::RBrace),
            ',' => self.emit(TokenKind::Comma),
            ';' => self.emit(TokenKind::Semicolon),

            _ => {
                self.error(format!("unrecognized character: {}", describe_char(ch)));
                return false;
            }
        }
        true
    }

    fn scan_number(&mut self) {
        while self.next().is_some_and(|c| c.is_ascii_digit()) {}
        self.backup();

        // A fractional part needs at least one digit after the point.
        let rest = &self.input[self.current..];
        let mut chars = rest.chars();
        if chars.next() == Some('.') && chars.next().is_some_and(|c| c.is_ascii_digit()) {
            self.next();
            while self.next().is_some_and(|c| c.is_ascii_digit()) {}
            self.backup();
        }
        self.emit(TokenKind::Number);
    }

    fn scan_string(&mut self) -> bool {
        loop {
            match self.next() {
                Some('\\') => {
                    if self.next().is_none() {
                        break;
                    }
                }
                Some('"') => {
                    self.emit(TokenKind::String);
                    return true;
                }
                Some('\n') | None => break,
                Some(_) => {}
            }
        }
        self.error("unterminated string literal".to_string());
        false
    }

    /// `//` has been consumed; the comment runs up to, not including, the newline.
    fn scan_line_comment(&mut self) {
        loop {
            match self.next() {
                Some('\n') => {
                    self.backup();
                    break;
                }
                None => break,
                Some(_) => {}
            }
        }
        let lexeme = &self.input[self.start..self.current];
        self.comments
            .push(Token::new(TokenKind::Comment, Pos(self.start), lexeme));
        self.start = self.current;
    }

    fn next(&mut self) -> Option<char> {
        match self.input[self.current..].chars().next() {
            Some(ch) => {
                self.width = ch.len_utf8();
                self.current += self.width;
                Some(ch)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    /// Step back over the last rune read. Only valid once per `next`.
    fn backup(&mut self) {
        self.current -= self.width;
        self.width = 0;
    }

    fn accept(&mut self, expected: char) -> bool {
        if self.next() == Some(expected) {
            true
        } else {
            self.backup();
            false
        }
    }

    fn ignore(&mut self) {
        self.start = self.current;
    }

    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|tok| tok.kind)
    }

    fn emit(&mut self, kind: TokenKind) {
        let lexeme = &self.input[self.start..self.current];
        let kind = if kind == TokenKind::Ident {
            TokenKind::lookup(lexeme)
        } else {
            kind
        };
        let token = Token::new(kind, Pos(self.start), lexeme);
        trace!("{}: {}", self.name, token);
        self.tokens.push(token);
        self.start = self.current;
    }

    fn emit_either(&mut self, second: char, long: TokenKind, short: TokenKind) {
        if self.accept(second) {
            self.emit(long);
        } else {
            self.emit(short);
        }
    }

    /// Two-character operator whose first character is not a token on its own.
    fn emit_pair(&mut self, second: char, kind: TokenKind, first: char) -> bool {
        if self.accept(second) {
            self.emit(kind);
            true
        } else {
            self.error(format!("unrecognized character: {}", describe_char(first)));
            false
        }
    }

    fn error(&mut self, message: String) {
        self.tokens
            .push(Token::new(TokenKind::Error, Pos(self.start), message));
        self.start = self.current;
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// `U+0040 '@'`
fn describe_char(ch: char) -> String {
    format!("U+{:04X} {:?}", ch as u32, ch)
}

/// Lex `input` into its token channel and its comment channel.
pub fn lex(name: &str, input: &str) -> (Vec<Token>, Vec<Token>) {
    Scanner::new(name, input).scan_all()
}

/// Lex `input`, turning an `ERROR` token into a positioned [`LexerError`].
pub fn tokenize(name: &str, input: &str) -> Result<(Vec<Token>, Vec<Token>), LexerError> {
    let (tokens, comments) = lex(name, input);
    if let Some(bad) = tokens.iter().find(|tok| tok.kind == TokenKind::Error) {
        return Err(LexerError::Illegal(
            bad.lexeme.clone(),
            bad.pos.position(name, input),
        ));
    }
    Ok((tokens, comments))
}
