use crate::lexer::{Pos, Position, Token, TokenKind};
use crate::parser::{
    BinaryExpr, BinaryOp, CallExpr, Expr, Ident, Node, Number, NumberValue, ParenExpr,
    ParserError, TokenStream, UnaryExpr, UnaryOp,
};

/// Deepest nesting of expressions and blocks accepted before parsing gives up.
pub const MAX_NESTING: usize = 128;

pub struct Parser {
    filename: String,
    source: String,
    pub(crate) stream: TokenStream,
    depth: usize,
}

impl Parser {
    /// Build a parser over tokens previously lexed from `source`.
    pub fn new(filename: impl Into<String>, source: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
            stream: TokenStream::new(tokens),
            depth: 0,
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve a byte offset for diagnostics.
    pub(crate) fn position(&self, pos: Pos) -> Position {
        pos.position(&self.filename, &self.source)
    }

    /// Source text covered by a node, used in diagnostics.
    pub(crate) fn text_of(&self, node: &impl Node) -> String {
        self.source
            .get(node.pos().offset()..node.end().offset())
            .unwrap_or_default()
            .to_string()
    }

    pub(crate) fn unexpected(&self, expected: &str, found: &Token) -> ParserError {
        ParserError::UnexpectedToken(
            expected.to_string(),
            describe_token(found),
            self.position(found.pos),
        )
    }

    /// Consume a token of one of the given kinds or fail with what was expected.
    pub(crate) fn expect(&mut self, kinds: &[TokenKind], expected: &str) -> Result<Token, ParserError> {
        self.stream
            .must_accept(kinds)
            .map_err(|found| self.unexpected(expected, &found))
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Ident, ParserError> {
        let tok = self.expect(&[TokenKind::Ident], "identifier")?;
        Ok(Ident::new(tok.pos, tok.lexeme))
    }

    /// Run `parse` one nesting level deeper, failing once [`MAX_NESTING`] is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        if self.depth >= MAX_NESTING {
            let pos = self.stream.peek().pos;
            return Err(ParserError::TooDeep(MAX_NESTING, self.position(pos)));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse an expression
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        self.parse_binary(1)
    }

    /// Parse a comma separated, non-empty expression list
    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParserError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.stream.accept(&[TokenKind::Comma]).is_some() {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    /// Precedence climbing: fold operators binding at least as tight as `prec`.
    fn parse_binary(&mut self, prec: u8) -> Result<Expr, ParserError> {
        let mut x = self.parse_unary()?;

        loop {
            let kind = self.stream.peek_kind();
            let Some(op) = BinaryOp::from_token(kind) else {
                return Ok(x);
            };
            if op.precedence() < prec {
                return Ok(x);
            }
            let op_tok = self.stream.read();
            let y = self.parse_binary(op.precedence() + 1)?;

            x = Expr::Binary(BinaryExpr {
                op_pos: op_tok.pos,
                op,
                x: Box::new(x),
                y: Box::new(y),
            });
        }
    }

    /// Parse unary expressions (+x, -x)
    fn parse_unary(&mut self) -> Result<Expr, ParserError> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParserError> {
        let Some(tok) = self.stream.accept(&[TokenKind::Add, TokenKind::Sub]) else {
            return self.parse_primary();
        };
        let op = if tok.kind == TokenKind::Sub {
            UnaryOp::Neg
        } else {
            UnaryOp::Plus
        };
        let x = self.parse_unary()?;
        Ok(Expr::Unary(UnaryExpr {
            op_pos: tok.pos,
            op,
            x: Box::new(x),
        }))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParserError> {
        let tok = self.stream.read();
        match tok.kind {
            TokenKind::Ident => {
                let ident = Ident::new(tok.pos, tok.lexeme);
                if self.stream.peek_kind() == TokenKind::LParen {
                    Ok(Expr::Call(self.parse_call(ident)?))
                } else {
                    Ok(Expr::Ident(ident))
                }
            }
            TokenKind::Number => self.parse_number(&tok).map(Expr::Number),
            TokenKind::LParen => {
                let x = self.parse_expr()?;
                let rparen = self.expect(&[TokenKind::RParen], "')'")?;
                Ok(Expr::Paren(ParenExpr {
                    lparen: tok.pos,
                    x: Box::new(x),
                    rparen: rparen.pos,
                }))
            }
            _ => Err(ParserError::ExpectedExpression(
                describe_token(&tok),
                self.position(tok.pos),
            )),
        }
    }

    /// Parse the argument list of a call to `func`
    pub(crate) fn parse_call(&mut self, func: Ident) -> Result<CallExpr, ParserError> {
        let lparen = self.expect(&[TokenKind::LParen], "'('")?;
        let args = if self.stream.peek_kind() == TokenKind::RParen {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        let rparen = self.expect(&[TokenKind::RParen], "')'")?;

        Ok(CallExpr {
            func,
            lparen: lparen.pos,
            args,
            rparen: rparen.pos,
        })
    }

    fn parse_number(&self, tok: &Token) -> Result<Number, ParserError> {
        let invalid = || ParserError::InvalidNumber(tok.lexeme.clone(), self.position(tok.pos));
        let value = if tok.lexeme.contains('.') {
            NumberValue::Float(tok.lexeme.parse().map_err(|_| invalid())?)
        } else {
            NumberValue::Int(tok.lexeme.parse().map_err(|_| invalid())?)
        };
        Ok(Number {
            value_pos: tok.pos,
            value_end: tok.end(),
            value,
        })
    }
}

/// Render a token for "found ..." diagnostics.
pub(crate) fn describe_token(tok: &Token) -> String {
    match tok.kind {
        TokenKind::Eof => "EOF".to_string(),
        TokenKind::Semicolon if tok.lexeme == "\n" => "newline".to_string(),
        _ => tok.lexeme.clone(),
    }
}
