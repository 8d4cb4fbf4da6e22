pub mod ast;
pub mod declarations;
pub mod errors;
pub mod expressions;
pub mod statements;
pub mod stream;

pub use ast::*;
pub use declarations::{parse_expr, parse_file};
pub use errors::*;
pub use expressions::{Parser, MAX_NESTING};
pub use stream::TokenStream;
