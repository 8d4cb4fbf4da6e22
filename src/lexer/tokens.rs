use crate::lexer::Pos;
use std::fmt;

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special tokens
    Eof,
    Error,
    Comment,

    // Literals and identifiers
    Ident,
    Number,
    String,

    // Keywords
    Package,
    Import,
    Var,
    Const,
    Type,
    Func,
    If,
    Else,
    For,
    Return,
    Defer,

    // Arithmetic operators
    Add,                // +
    Sub,                // -
    Mul,                // *
    Div,                // /
    Mod,                // %

    // Relational operators
    Eql,                // ==
    Neq,                // !=
    Lss,                // <
    Leq,                // <=
    Gtr,                // >
    Geq,                // >=

    // Logical operators
    LogicalAnd,         // &&
    LogicalOr,          // ||

    // Assignment operators
    Assign,             // =
    Define,             // :=
    AddAssign,          // +=
    SubAssign,          // -=
    MulAssign,          // *=
    DivAssign,          // /=
    ModAssign,          // %=

    // Punctuation
    LParen,             // (
    RParen,             // )
    LBrace,             // {
    RBrace,             // }
    Comma,              // ,
    Semicolon,          // ;
}

impl TokenKind {
    pub const ALL: [TokenKind; 43] = [
        TokenKind::Eof,
        TokenKind::Error,
        TokenKind::Comment,
        TokenKind::Ident,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Package,
        TokenKind::Import,
        TokenKind::Var,
        TokenKind::Const,
        TokenKind::Type,
        TokenKind::Func,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::For,
        TokenKind::Return,
        TokenKind::Defer,
        TokenKind::Add,
        TokenKind::Sub,
        TokenKind::Mul,
        TokenKind::Div,
        TokenKind::Mod,
        TokenKind::Eql,
        TokenKind::Neq,
        TokenKind::Lss,
        TokenKind::Leq,
        TokenKind::Gtr,
        TokenKind::Geq,
        TokenKind::LogicalAnd,
        TokenKind::LogicalOr,
        TokenKind::Assign,
        TokenKind::Define,
        TokenKind::AddAssign,
        TokenKind::SubAssign,
        TokenKind::MulAssign,
        TokenKind::DivAssign,
        TokenKind::ModAssign,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::Comma,
        TokenKind::Semicolon,
    ];

    /// Resolve an identifier to its keyword kind, or `Ident` if it is not reserved.
    #[must_use]
    pub fn lookup(ident: &str) -> Self {
        match ident {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "type" => TokenKind::Type,
            "func" => TokenKind::Func,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "defer" => TokenKind::Defer,
            _ => TokenKind::Ident,
        }
    }

    /// Whether a newline directly after this kind terminates the statement.
    #[must_use]
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::RParen
                | TokenKind::RBrace
                | TokenKind::Return
        )
    }

    /// Binary operator precedence; 0 for anything that is not a binary operator.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            TokenKind::LogicalOr => 1,
            TokenKind::LogicalAnd => 2,
            TokenKind::Eql
            | TokenKind::Neq
            | TokenKind::Lss
            | TokenKind::Leq
            | TokenKind::Gtr
            | TokenKind::Geq => 3,
            TokenKind::Add | TokenKind::Sub => 4,
            TokenKind::Mul | TokenKind::Div | TokenKind::Mod => 5,
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Package
                | TokenKind::Import
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Type
                | TokenKind::Func
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Defer
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Error => "ERROR",
            TokenKind::Comment => "COMMENT",
            TokenKind::Ident => "IDENT",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Package => "package",
            TokenKind::Import => "import",
            TokenKind::Var => "var",
            TokenKind::Const => "const",
            TokenKind::Type => "type",
            TokenKind::Func => "func",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::Return => "return",
            TokenKind::Defer => "defer",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::Eql => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lss => "<",
            TokenKind::Leq => "<=",
            TokenKind::Gtr => ">",
            TokenKind::Geq => ">=",
            TokenKind::LogicalAnd => "&&",
            TokenKind::LogicalOr => "||",
            TokenKind::Assign => "=",
            TokenKind::Define => ":=",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::ModAssign => "%=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
        };
        write!(f, "{s}")
    }
}

/// A token with position information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            lexeme: lexeme.into(),
        }
    }

    /// Position just past the last byte of the lexeme.
    #[must_use]
    pub fn end(&self) -> Pos {
        self.pos.advance(self.lexeme.len())
    }

    /// Decode a `STRING` lexeme, dropping the quotes and resolving escapes.
    #[must_use]
    pub fn string_value(&self) -> String {
        let inner = self
            .lexeme
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(&self.lexeme);

        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                value.push(ch);
                continue;
            }
            match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('0') => value.push('\0'),
                Some(other) => value.push(other),
                None => value.push('\\'),
            }
        }
        value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{:?}", self.kind, self.lexeme)
    }
}
