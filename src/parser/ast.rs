use crate::lexer::{Pos, TokenKind};
use std::fmt;

/// Source span shared by every AST node.
pub trait Node {
    /// Offset of the first byte belonging to the node.
    fn pos(&self) -> Pos;
    /// Offset just past the last byte belonging to the node.
    fn end(&self) -> Pos;
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub filename: String,
    pub source: String,
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub consts: Vec<ConstSpec>,
    pub types: Vec<TypeSpec>,
    pub globals: Vec<VarSpec>,
    pub funcs: Vec<Func>,
}

impl File {
    /// Look up a top-level function (not a method) by name.
    #[must_use]
    pub fn func(&self, name: &str) -> Option<&Func> {
        self.funcs
            .iter()
            .find(|f| f.recv.is_none() && f.name.name == name)
    }
}

/// `import "path"` or `import name "path"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub import_pos: Pos,
    pub name: Option<Ident>,
    pub path: String,
    pub path_end: Pos,
}

/// A function or method declaration; a missing body makes it external.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub func_pos: Pos,
    pub recv: Option<Field>,
    pub name: Ident,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub body: Option<BlockStmt>,
}

impl Func {
    /// Number of incoming values, counting the receiver.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len() + usize::from(self.recv.is_some())
    }
}

/// A parameter, receiver or result. At least one of the two parts is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Option<Ident>,
    pub ty: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    pub var_pos: Pos,
    pub name: Ident,
    pub ty: Option<Ident>,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstSpec {
    pub const_pos: Pos,
    pub name: Ident,
    pub ty: Option<Ident>,
    pub value: Expr,
}

/// `type Name Base` or the alias form `type Name = Base`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub type_pos: Pos,
    pub name: Ident,
    pub assign: Option<Pos>,
    pub ty: Ident,
}

/// Statement variants
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Var(VarSpec),
    Const(ConstSpec),
    Type(TypeSpec),
    Block(BlockStmt),
    If(IfStmt),
    For(ForStmt),
    Assign(AssignStmt),
    Defer(DeferStmt),
    Return(ReturnStmt),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub lbrace: Pos,
    pub stmts: Vec<Stmt>,
    pub rbrace: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub if_pos: Pos,
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub body: BlockStmt,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(BlockStmt),
}

/// `for {}`, `for cond {}` or `for init; cond; post {}`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub for_pos: Pos,
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `:=`
    Define,
    /// `=`
    Assign,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssignOp::Define => write!(f, ":="),
            AssignOp::Assign => write!(f, "="),
        }
    }
}

/// Targets and values always have the same, non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub targets: Vec<Ident>,
    pub op_pos: Pos,
    pub op: AssignOp,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferStmt {
    pub defer_pos: Pos,
    pub call: CallExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub return_pos: Pos,
    pub results: Vec<Expr>,
}

/// Expression variants
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Number(Number),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Paren(ParenExpr),
    Call(CallExpr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name_pos: Pos,
    pub name: String,
}

impl Ident {
    pub fn new(name_pos: Pos, name: impl Into<String>) -> Self {
        Self {
            name_pos,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value_pos: Pos,
    pub value_end: Pos,
    pub value: NumberValue,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,

    // Logical
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    #[must_use]
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Add => BinaryOp::Add,
            TokenKind::Sub => BinaryOp::Sub,
            TokenKind::Mul => BinaryOp::Mul,
            TokenKind::Div => BinaryOp::Div,
            TokenKind::Mod => BinaryOp::Mod,
            TokenKind::Eql => BinaryOp::Eql,
            TokenKind::Neq => BinaryOp::Neq,
            TokenKind::Lss => BinaryOp::Lss,
            TokenKind::Leq => BinaryOp::Leq,
            TokenKind::Gtr => BinaryOp::Gtr,
            TokenKind::Geq => BinaryOp::Geq,
            TokenKind::LogicalAnd => BinaryOp::LogicalAnd,
            TokenKind::LogicalOr => BinaryOp::LogicalOr,
            _ => return None,
        };
        Some(op)
    }

    /// The arithmetic operator a compound assignment such as `+=` applies.
    #[must_use]
    pub fn from_compound_assign(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::AddAssign => BinaryOp::Add,
            TokenKind::SubAssign => BinaryOp::Sub,
            TokenKind::MulAssign => BinaryOp::Mul,
            TokenKind::DivAssign => BinaryOp::Div,
            TokenKind::ModAssign => BinaryOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    #[must_use]
    pub fn token(self) -> TokenKind {
        match self {
            BinaryOp::Add => TokenKind::Add,
            BinaryOp::Sub => TokenKind::Sub,
            BinaryOp::Mul => TokenKind::Mul,
            BinaryOp::Div => TokenKind::Div,
            BinaryOp::Mod => TokenKind::Mod,
            BinaryOp::Eql => TokenKind::Eql,
            BinaryOp::Neq => TokenKind::Neq,
            BinaryOp::Lss => TokenKind::Lss,
            BinaryOp::Leq => TokenKind::Leq,
            BinaryOp::Gtr => TokenKind::Gtr,
            BinaryOp::Geq => TokenKind::Geq,
            BinaryOp::LogicalAnd => TokenKind::LogicalAnd,
            BinaryOp::LogicalOr => TokenKind::LogicalOr,
        }
    }

    #[must_use]
    pub fn precedence(self) -> u8 {
        self.token().precedence()
    }

    #[must_use]
    pub fn is_comparison(self) -> bool {
        self.precedence() == TokenKind::Eql.precedence()
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op_pos: Pos,
    pub op: BinaryOp,
    pub x: Box<Expr>,
    pub y: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op_pos: Pos,
    pub op: UnaryOp,
    pub x: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub lparen: Pos,
    pub x: Box<Expr>,
    pub rparen: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub func: Ident,
    pub lparen: Pos,
    pub args: Vec<Expr>,
    pub rparen: Pos,
}

impl Node for Ident {
    fn pos(&self) -> Pos {
        self.name_pos
    }
    fn end(&self) -> Pos {
        self.name_pos.advance(self.name.len())
    }
}

impl Node for Number {
    fn pos(&self) -> Pos {
        self.value_pos
    }
    fn end(&self) -> Pos {
        self.value_end
    }
}

impl Node for BinaryExpr {
    fn pos(&self) -> Pos {
        self.x.pos()
    }
    fn end(&self) -> Pos {
        self.y.end()
    }
}

impl Node for UnaryExpr {
    fn pos(&self) -> Pos {
        self.op_pos
    }
    fn end(&self) -> Pos {
        self.x.end()
    }
}

impl Node for ParenExpr {
    fn pos(&self) -> Pos {
        self.lparen
    }
    fn end(&self) -> Pos {
        self.rparen.advance(1)
    }
}

impl Node for CallExpr {
    fn pos(&self) -> Pos {
        self.func.pos()
    }
    fn end(&self) -> Pos {
        self.rparen.advance(1)
    }
}

impl Node for Expr {
    fn pos(&self) -> Pos {
        match self {
            Expr::Ident(e) => e.pos(),
            Expr::Number(e) => e.pos(),
            Expr::Binary(e) => e.pos(),
            Expr::Unary(e) => e.pos(),
            Expr::Paren(e) => e.pos(),
            Expr::Call(e) => e.pos(),
        }
    }
    fn end(&self) -> Pos {
        match self {
            Expr::Ident(e) => e.end(),
            Expr::Number(e) => e.end(),
            Expr::Binary(e) => e.end(),
            Expr::Unary(e) => e.end(),
            Expr::Paren(e) => e.end(),
            Expr::Call(e) => e.end(),
        }
    }
}

impl Node for BlockStmt {
    fn pos(&self) -> Pos {
        self.lbrace
    }
    fn end(&self) -> Pos {
        self.rbrace.advance(1)
    }
}

impl Node for IfStmt {
    fn pos(&self) -> Pos {
        self.if_pos
    }
    fn end(&self) -> Pos {
        match &self.else_branch {
            Some(ElseBranch::If(s)) => s.end(),
            Some(ElseBranch::Block(b)) => b.end(),
            None => self.body.end(),
        }
    }
}

impl Node for ForStmt {
    fn pos(&self) -> Pos {
        self.for_pos
    }
    fn end(&self) -> Pos {
        self.body.end()
    }
}

impl Node for AssignStmt {
    fn pos(&self) -> Pos {
        self.targets.first().map_or(self.op_pos, Node::pos)
    }
    fn end(&self) -> Pos {
        self.values.last().map_or(self.op_pos, Node::end)
    }
}

impl Node for DeferStmt {
    fn pos(&self) -> Pos {
        self.defer_pos
    }
    fn end(&self) -> Pos {
        self.call.end()
    }
}

impl Node for ReturnStmt {
    fn pos(&self) -> Pos {
        self.return_pos
    }
    fn end(&self) -> Pos {
        self.results
            .last()
            .map_or(self.return_pos.advance("return".len()), Node::end)
    }
}

impl Node for VarSpec {
    fn pos(&self) -> Pos {
        self.var_pos
    }
    fn end(&self) -> Pos {
        match (&self.value, &self.ty) {
            (Some(v), _) => v.end(),
            (None, Some(t)) => t.end(),
            (None, None) => self.name.end(),
        }
    }
}

impl Node for ConstSpec {
    fn pos(&self) -> Pos {
        self.const_pos
    }
    fn end(&self) -> Pos {
        self.value.end()
    }
}

impl Node for TypeSpec {
    fn pos(&self) -> Pos {
        self.type_pos
    }
    fn end(&self) -> Pos {
        self.ty.end()
    }
}

impl Node for Stmt {
    fn pos(&self) -> Pos {
        match self {
            Stmt::Var(s) => s.pos(),
            Stmt::Const(s) => s.pos(),
            Stmt::Type(s) => s.pos(),
            Stmt::Block(s) => s.pos(),
            Stmt::If(s) => s.pos(),
            Stmt::For(s) => s.pos(),
            Stmt::Assign(s) => s.pos(),
            Stmt::Defer(s) => s.pos(),
            Stmt::Return(s) => s.pos(),
            Stmt::Expr(s) => s.pos(),
        }
    }
    fn end(&self) -> Pos {
        match self {
            Stmt::Var(s) => s.end(),
            Stmt::Const(s) => s.end(),
            Stmt::Type(s) => s.end(),
            Stmt::Block(s) => s.end(),
            Stmt::If(s) => s.end(),
            Stmt::For(s) => s.end(),
            Stmt::Assign(s) => s.end(),
            Stmt::Defer(s) => s.end(),
            Stmt::Return(s) => s.end(),
            Stmt::Expr(s) => s.end(),
        }
    }
}

impl Node for Field {
    fn pos(&self) -> Pos {
        self.name
            .as_ref()
            .or(self.ty.as_ref())
            .map_or(Pos::default(), Node::pos)
    }
    fn end(&self) -> Pos {
        self.ty
            .as_ref()
            .or(self.name.as_ref())
            .map_or(Pos::default(), Node::end)
    }
}

impl Node for Func {
    fn pos(&self) -> Pos {
        self.func_pos
    }
    fn end(&self) -> Pos {
        if let Some(body) = &self.body {
            return body.end();
        }
        self.results
            .last()
            .or(self.params.last())
            .map_or(self.name.end(), Node::end)
    }
}

impl Node for ImportSpec {
    fn pos(&self) -> Pos {
        self.import_pos
    }
    fn end(&self) -> Pos {
        self.path_end
    }
}
