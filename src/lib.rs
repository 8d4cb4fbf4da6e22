//! µGo compiler
//!
//! Lexes, parses and lowers µGo, a small Go-like language, to textual LLVM IR.
//! Generated modules call two runtime functions, `println` and `exit`, whose
//! definitions live in [`BUILTIN_RUNTIME`].

pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod symbol;

pub use codegen::{CodeGenerator, CodegenError, BUILTIN_RUNTIME};
pub use lexer::{lex, tokenize, LexerError, Pos, Position, Token, TokenKind};
pub use parser::{parse_expr, parse_file, File, ParserError};
pub use symbol::{ScopeTree, Universe};

use log::debug;
use thiserror::Error;

/// Any failure of the pipeline, from lexing to IR generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexerError),

    #[error(transparent)]
    Parse(#[from] ParserError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Compile a µGo source file to an IR module.
///
/// # Errors
/// The first error raised by any stage; no partial output is produced.
pub fn compile_source(filename: &str, source: &str) -> Result<String, CompileError> {
    let file = parse_file(filename, source)?;
    debug!(
        "parsed {filename}: {} funcs, {} globals, {} consts",
        file.funcs.len(),
        file.globals.len(),
        file.consts.len()
    );
    let ir = CodeGenerator::new().generate(&file)?;
    Ok(ir)
}

/// Compile a bare expression into a module whose `main` returns its value.
///
/// # Errors
/// The first error raised by any stage.
pub fn compile_expr_source(filename: &str, source: &str) -> Result<String, CompileError> {
    let expr = parse_expr(filename, source)?;
    let ir = CodeGenerator::new().generate_expr(filename, source, &expr)?;
    Ok(ir)
}
