use crate::lexer::{tokenize, TokenKind};
use crate::parser::expressions::Parser;
use crate::parser::{
    ConstSpec, Expr, Field, File, Func, Ident, ImportSpec, ParserError, TypeSpec, VarSpec,
};
use log::debug;

/// Lex and parse a whole source file.
///
/// # Errors
/// The first lexical or grammatical error, with its position in `filename`.
pub fn parse_file(filename: &str, source: &str) -> Result<File, ParserError> {
    let (tokens, _comments) = tokenize(filename, source)?;
    Parser::new(filename, source, tokens).parse_file()
}

/// Lex and parse a single expression spanning the whole input.
///
/// # Errors
/// The first lexical or grammatical error, or trailing input after the expression.
pub fn parse_expr(filename: &str, source: &str) -> Result<Expr, ParserError> {
    let (tokens, _comments) = tokenize(filename, source)?;
    let mut parser = Parser::new(filename, source, tokens);
    let expr = parser.parse_expr()?;
    parser.stream.accept_run(&[TokenKind::Semicolon]);
    parser.expect(&[TokenKind::Eof], "end of input")?;
    Ok(expr)
}

impl Parser {
    /// Parse `package name`, then imports, then top-level declarations
    pub fn parse_file(mut self) -> Result<File, ParserError> {
        self.stream.accept_run(&[TokenKind::Semicolon]);
        self.expect(&[TokenKind::Package], "'package'")?;
        let package = self.expect_ident()?;
        self.end_decl()?;
        debug!("parsing package {} from {}", package.name, self.filename());

        let mut imports = Vec::new();
        while self.stream.peek_kind() == TokenKind::Import {
            imports.push(self.parse_import()?);
            self.end_decl()?;
        }

        let mut consts = Vec::new();
        let mut types = Vec::new();
        let mut globals = Vec::new();
        let mut funcs = Vec::new();

        loop {
            self.stream.accept_run(&[TokenKind::Semicolon]);
            match self.stream.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Const => {
                    let spec = self.parse_const_spec()?;
                    debug!("const {}", spec.name.name);
                    consts.push(spec);
                }
                TokenKind::Type => {
                    let spec = self.parse_type_spec()?;
                    debug!("type {}", spec.name.name);
                    types.push(spec);
                }
                TokenKind::Var => {
                    let spec = self.parse_var_spec()?;
                    debug!("var {}", spec.name.name);
                    globals.push(spec);
                }
                TokenKind::Func => {
                    let func = self.parse_func()?;
                    debug!("func {}", func.name.name);
                    funcs.push(func);
                }
                _ => {
                    let found = self.stream.peek();
                    return Err(self.unexpected("declaration", &found));
                }
            }
            self.end_decl()?;
        }

        Ok(File {
            filename: self.filename().to_string(),
            source: self.source().to_string(),
            package,
            imports,
            consts,
            types,
            globals,
            funcs,
        })
    }

    /// Top-level declarations end at `;` or EOF.
    fn end_decl(&mut self) -> Result<(), ParserError> {
        if self.stream.accept_run(&[TokenKind::Semicolon]) > 0 || self.stream.is_eof() {
            return Ok(());
        }
        let found = self.stream.peek();
        Err(self.unexpected("';' or newline", &found))
    }

    /// Parse `import "path"` or `import name "path"`
    fn parse_import(&mut self) -> Result<ImportSpec, ParserError> {
        let import_tok = self.expect(&[TokenKind::Import], "'import'")?;
        let name = self.accept_ident();
        let path = self.expect(&[TokenKind::String], "import path")?;

        Ok(ImportSpec {
            import_pos: import_tok.pos,
            name,
            path: path.string_value(),
            path_end: path.end(),
        })
    }

    /// Parse `var name [type] [= value]`
    pub(crate) fn parse_var_spec(&mut self) -> Result<VarSpec, ParserError> {
        let var_tok = self.expect(&[TokenKind::Var], "'var'")?;
        let name = self.expect_ident()?;
        let ty = self.accept_ident();
        let value = if self.stream.accept(&[TokenKind::Assign]).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(VarSpec {
            var_pos: var_tok.pos,
            name,
            ty,
            value,
        })
    }

    /// Parse `const name [type] = value`
    pub(crate) fn parse_const_spec(&mut self) -> Result<ConstSpec, ParserError> {
        let const_tok = self.expect(&[TokenKind::Const], "'const'")?;
        let name = self.expect_ident()?;
        let ty = self.accept_ident();
        self.expect(&[TokenKind::Assign], "'='")?;
        let value = self.parse_expr()?;

        Ok(ConstSpec {
            const_pos: const_tok.pos,
            name,
            ty,
            value,
        })
    }

    /// Parse `type Name Base` or `type Name = Base`
    pub(crate) fn parse_type_spec(&mut self) -> Result<TypeSpec, ParserError> {
        let type_tok = self.expect(&[TokenKind::Type], "'type'")?;
        let name = self.expect_ident()?;
        let assign = self.stream.accept(&[TokenKind::Assign]).map(|tok| tok.pos);
        let ty = self.expect_ident()?;

        Ok(TypeSpec {
            type_pos: type_tok.pos,
            name,
            assign,
            ty,
        })
    }

    /// Parse a function or method; a missing body declares an external function.
    ///
    /// ```text
    /// func name(a int, b int) int { ... }
    /// func (p *Point) name() (int) { ... }
    /// func name(x int)
    /// ```
    fn parse_func(&mut self) -> Result<Func, ParserError> {
        let func_tok = self.expect(&[TokenKind::Func], "'func'")?;

        let recv = if self.stream.accept(&[TokenKind::LParen]).is_some() {
            let field = self.parse_field(false)?;
            self.expect(&[TokenKind::RParen], "')'")?;
            Some(field)
        } else {
            None
        };

        let name = self.expect_ident()?;

        self.expect(&[TokenKind::LParen], "'('")?;
        let params = self.parse_field_list(false)?;
        self.expect(&[TokenKind::RParen], "')'")?;

        let results = if self.stream.accept(&[TokenKind::LParen]).is_some() {
            let results = self.parse_field_list(true)?;
            self.expect(&[TokenKind::RParen], "')'")?;
            results
        } else if self.stream.peek_kind() == TokenKind::Ident {
            vec![self.parse_field(true)?]
        } else {
            Vec::new()
        };

        let body = if self.stream.peek_kind() == TokenKind::LBrace {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Func {
            func_pos: func_tok.pos,
            recv,
            name,
            params,
            results,
            body,
        })
    }

    /// Comma separated fields up to, not including, `)`.
    fn parse_field_list(&mut self, lone_is_type: bool) -> Result<Vec<Field>, ParserError> {
        let mut fields = Vec::new();
        if self.stream.peek_kind() == TokenKind::RParen {
            return Ok(fields);
        }
        loop {
            fields.push(self.parse_field(lone_is_type)?);
            if self.stream.accept(&[TokenKind::Comma]).is_none() {
                return Ok(fields);
            }
        }
    }

    /// `name [*]type`, `name` or `type`. A lone identifier names the field
    /// in parameter lists and gives its type in result lists.
    fn parse_field(&mut self, lone_is_type: bool) -> Result<Field, ParserError> {
        let first = self.expect_ident()?;
        let pointer = self.stream.accept(&[TokenKind::Mul]);

        let ty = match (pointer, self.accept_ident()) {
            (_, Some(ty)) => Some(ty),
            (Some(star), None) => {
                let found = self.stream.peek();
                return Err(self.unexpected(
                    &format!("type after '{}'", star.lexeme),
                    &found,
                ));
            }
            (None, None) => None,
        };

        Ok(match ty {
            Some(ty) => Field {
                name: Some(first),
                ty: Some(ty),
            },
            None if lone_is_type => Field {
                name: None,
                ty: Some(first),
            },
            None => Field {
                name: Some(first),
                ty: None,
            },
        })
    }

    fn accept_ident(&mut self) -> Option<Ident> {
        self.stream
            .accept(&[TokenKind::Ident])
            .map(|tok| Ident::new(tok.pos, tok.lexeme))
    }
}

