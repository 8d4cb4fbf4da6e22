use crate::lexer::{LexerError, Position};
use thiserror::Error;

/// Parser error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("{2}: expected {0}, found '{1}'")]
    UnexpectedToken(String, String, Position),

    #[error("{1}: expected expression, found '{0}'")]
    ExpectedExpression(String, Position),

    #[error("{2}: assignment mismatch: {0} variables but {1} values")]
    AssignmentMismatch(usize, usize, Position),

    #[error("{1}: cannot assign to {0}")]
    InvalidAssignTarget(String, Position),

    #[error("{1}: expected 1 expression, found {0}")]
    ExpressionListNotAllowed(usize, Position),

    #[error("{1}: cannot use {0} as value")]
    NotAnExpression(String, Position),

    #[error("{1}: expression in defer must be function call, found '{0}'")]
    DeferRequiresCall(String, Position),

    #[error("{1}: invalid number literal '{0}'")]
    InvalidNumber(String, Position),

    #[error("{1}: nesting exceeds {0} levels")]
    TooDeep(usize, Position),

    #[error(transparent)]
    Lexer(#[from] LexerError),
}
