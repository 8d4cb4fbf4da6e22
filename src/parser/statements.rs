use crate::lexer::{Pos, TokenKind};
use crate::parser::expressions::Parser;
use crate::parser::{
    AssignOp, AssignStmt, BinaryExpr, BinaryOp, BlockStmt, DeferStmt, ElseBranch, Expr, ForStmt,
    IfStmt, Node, ParserError, ReturnStmt, Stmt,
};

impl Parser {
    /// Parse a statement together with its terminator
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParserError> {
        let stmt = match self.stream.peek_kind() {
            TokenKind::Var => Stmt::Var(self.parse_var_spec()?),
            TokenKind::Const => Stmt::Const(self.parse_const_spec()?),
            TokenKind::Type => Stmt::Type(self.parse_type_spec()?),
            TokenKind::LBrace => Stmt::Block(self.parse_block()?),
            TokenKind::If => Stmt::If(self.parse_if()?),
            TokenKind::For => Stmt::For(self.parse_for()?),
            TokenKind::Defer => Stmt::Defer(self.parse_defer()?),
            TokenKind::Return => Stmt::Return(self.parse_return()?),
            _ => self.parse_simple_stmt()?,
        };
        self.end_stmt()?;
        Ok(stmt)
    }

    /// A statement ends at `;` (explicit or inserted at a newline), or right before `}` or EOF.
    pub(crate) fn end_stmt(&mut self) -> Result<(), ParserError> {
        if self.stream.accept(&[TokenKind::Semicolon]).is_some() {
            return Ok(());
        }
        match self.stream.peek_kind() {
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => {
                let found = self.stream.peek();
                Err(self.unexpected("';' or newline", &found))
            }
        }
    }

    /// Parse a block statement { ... }
    pub(crate) fn parse_block(&mut self) -> Result<BlockStmt, ParserError> {
        self.nested(Self::parse_block_inner)
    }

    fn parse_block_inner(&mut self) -> Result<BlockStmt, ParserError> {
        let lbrace = self.expect(&[TokenKind::LBrace], "'{'")?;

        let mut stmts = Vec::new();
        loop {
            self.stream.accept_run(&[TokenKind::Semicolon]);
            if matches!(self.stream.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
                break;
            }
            stmts.push(self.parse_stmt()?);
        }

        let rbrace = self.expect(&[TokenKind::RBrace], "'}'")?;

        Ok(BlockStmt {
            lbrace: lbrace.pos,
            stmts,
            rbrace: rbrace.pos,
        })
    }

    /// Parse an expression statement or an assignment
    pub(crate) fn parse_simple_stmt(&mut self) -> Result<Stmt, ParserError> {
        let mut exprs = self.parse_expr_list()?;
        let tok = self.stream.peek();

        match tok.kind {
            TokenKind::Define | TokenKind::Assign => {
                self.stream.read();
                let op = if tok.kind == TokenKind::Define {
                    AssignOp::Define
                } else {
                    AssignOp::Assign
                };
                let values = self.parse_expr_list()?;

                let targets = exprs
                    .into_iter()
                    .map(|target| match target {
                        Expr::Ident(ident) => Ok(ident),
                        other => Err(ParserError::InvalidAssignTarget(
                            self.text_of(&other),
                            self.position(other.pos()),
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                if targets.len() != values.len() {
                    return Err(ParserError::AssignmentMismatch(
                        targets.len(),
                        values.len(),
                        self.position(tok.pos),
                    ));
                }

                Ok(Stmt::Assign(AssignStmt {
                    targets,
                    op_pos: tok.pos,
                    op,
                    values,
                }))
            }

            kind => {
                if let Some(op) = BinaryOp::from_compound_assign(kind) {
                    self.stream.read();
                    return self.create_compound_assignment(exprs, op, tok.pos);
                }

                if exprs.len() != 1 {
                    return Err(ParserError::ExpressionListNotAllowed(
                        exprs.len(),
                        self.position(exprs[0].pos()),
                    ));
                }
                let expr = exprs.remove(0);
                Ok(Stmt::Expr(expr))
            }
        }
    }

    /// Desugar `x op= e` into `x = x op e`
    fn create_compound_assignment(
        &mut self,
        mut targets: Vec<Expr>,
        op: BinaryOp,
        op_pos: Pos,
    ) -> Result<Stmt, ParserError> {
        if targets.len() != 1 {
            return Err(ParserError::ExpressionListNotAllowed(
                targets.len(),
                self.position(targets[0].pos()),
            ));
        }
        let target = match targets.remove(0) {
            Expr::Ident(ident) => ident,
            other => {
                return Err(ParserError::InvalidAssignTarget(
                    self.text_of(&other),
                    self.position(other.pos()),
                ))
            }
        };
        let value = self.parse_expr()?;

        Ok(Stmt::Assign(AssignStmt {
            targets: vec![target.clone()],
            op_pos,
            op: AssignOp::Assign,
            values: vec![Expr::Binary(BinaryExpr {
                op_pos,
                op,
                x: Box::new(Expr::Ident(target)),
                y: Box::new(value),
            })],
        }))
    }

    /// A simple statement used where only an expression is allowed.
    fn stmt_as_expr(&self, stmt: Stmt) -> Result<Expr, ParserError> {
        match stmt {
            Stmt::Expr(expr) => Ok(expr),
            other => Err(ParserError::NotAnExpression(
                self.text_of(&other),
                self.position(other.pos()),
            )),
        }
    }

    /// Parse an if statement, including any else-if chain
    pub(crate) fn parse_if(&mut self) -> Result<IfStmt, ParserError> {
        let if_tok = self.expect(&[TokenKind::If], "'if'")?;

        let first = self.parse_simple_stmt()?;
        let (init, cond) = if self.stream.accept(&[TokenKind::Semicolon]).is_some() {
            (Some(Box::new(first)), self.parse_expr()?)
        } else {
            (None, self.stmt_as_expr(first)?)
        };

        let body = self.parse_block()?;

        let else_branch = if self.stream.accept(&[TokenKind::Else]).is_some() {
            if self.stream.peek_kind() == TokenKind::If {
                Some(ElseBranch::If(Box::new(self.nested(Self::parse_if)?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(IfStmt {
            if_pos: if_tok.pos,
            init,
            cond,
            body,
            else_branch,
        })
    }

    /// Parse `for {}`, `for cond {}` or `for init; cond; post {}`
    pub(crate) fn parse_for(&mut self) -> Result<ForStmt, ParserError> {
        let for_tok = self.expect(&[TokenKind::For], "'for'")?;

        let mut stmt = ForStmt {
            for_pos: for_tok.pos,
            init: None,
            cond: None,
            post: None,
            body: BlockStmt {
                lbrace: for_tok.pos,
                stmts: Vec::new(),
                rbrace: for_tok.pos,
            },
        };

        if self.stream.accept(&[TokenKind::LBrace]).is_some() {
            self.stream.unread();
            stmt.body = self.parse_block()?;
            return Ok(stmt);
        }

        if self.stream.accept(&[TokenKind::Semicolon]).is_none() {
            let first = self.parse_simple_stmt()?;

            if self.stream.peek_kind() == TokenKind::LBrace {
                stmt.cond = Some(self.stmt_as_expr(first)?);
                stmt.body = self.parse_block()?;
                return Ok(stmt);
            }

            self.expect(&[TokenKind::Semicolon], "';'")?;
            stmt.init = Some(Box::new(first));
        }

        if self.stream.peek_kind() != TokenKind::Semicolon {
            stmt.cond = Some(self.parse_expr()?);
        }
        self.expect(&[TokenKind::Semicolon], "';'")?;

        if self.stream.peek_kind() != TokenKind::LBrace {
            stmt.post = Some(Box::new(self.parse_simple_stmt()?));
        }

        stmt.body = self.parse_block()?;
        Ok(stmt)
    }

    /// Parse `defer f(args)`
    fn parse_defer(&mut self) -> Result<DeferStmt, ParserError> {
        let defer_tok = self.expect(&[TokenKind::Defer], "'defer'")?;
        match self.parse_expr()? {
            Expr::Call(call) => Ok(DeferStmt {
                defer_pos: defer_tok.pos,
                call,
            }),
            other => Err(ParserError::DeferRequiresCall(
                self.text_of(&other),
                self.position(other.pos()),
            )),
        }
    }

    /// Parse a return statement
    fn parse_return(&mut self) -> Result<ReturnStmt, ParserError> {
        let return_tok = self.expect(&[TokenKind::Return], "'return'")?;

        let results = match self.stream.peek_kind() {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => Vec::new(),
            _ => self.parse_expr_list()?,
        };

        Ok(ReturnStmt {
            return_pos: return_tok.pos,
            results,
        })
    }
}
