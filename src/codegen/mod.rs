pub mod builtin;
pub mod errors;
pub mod generator;

pub use builtin::*;
pub use errors::*;
pub use generator::*;
