use crate::lexer::Position;
use thiserror::Error;

/// Code generation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("{1}: undefined: {0}")]
    UndefinedVariable(String, Position),

    #[error("{1}: undefined function: {0}")]
    UndefinedFunction(String, Position),

    #[error("{1}: cannot call non-function {0}")]
    NotAFunction(String, Position),

    #[error("{1}: {0} is not a variable")]
    NotAVariable(String, Position),

    #[error("{1}: cannot assign to constant {0}")]
    AssignToConstant(String, Position),

    #[error("{1}: {0} redeclared in this block")]
    Redeclared(String, Position),

    #[error("{3}: function '{0}' expects {1} arguments but got {2}")]
    ArgumentCountMismatch(String, usize, usize, Position),

    #[error("{1}: too many return values: {0}")]
    TooManyResults(usize, Position),

    #[error("{1}: floating point literal {0} is not supported")]
    UnsupportedFloat(String, Position),

    #[error("{1}: integer literal {0} overflows i32")]
    IntegerOverflow(String, Position),

    #[error("writing IR: {0}")]
    Fmt(#[from] std::fmt::Error),
}
