use thiserror::Error;

/// Byte offset into the source text, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(pub usize);

impl Pos {
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }

    /// Advance by `len` bytes.
    #[must_use]
    pub fn advance(self, len: usize) -> Self {
        Pos(self.0 + len)
    }

    /// Resolve the offset into a line/column position within `source`.
    #[must_use]
    pub fn position(self, filename: &str, source: &str) -> Position {
        let offset = self.0.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for c in source.as_bytes()[..offset].iter() {
            if *c == b'\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position {
            filename: filename.to_string(),
            line,
            column,
        }
    }
}

/// Position in source file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub filename: String,
    /// 1-based; 0 means unknown
    pub line: usize,
    /// 1-based; 0 means unknown
    pub column: usize,
}

impl Position {
    pub fn new(filename: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
        }
    }

    /// A position with no file context at all; displays as `-`.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = self.filename.clone();
        if self.is_valid() {
            if !s.is_empty() {
                s.push(':');
            }
            s.push_str(&self.line.to_string());
            if self.column != 0 {
                s.push(':');
                s.push_str(&self.column.to_string());
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        write!(f, "{s}")
    }
}

/// Lexer error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    #[error("{1}: invalid token: {0}")]
    Illegal(String, Position),
}
