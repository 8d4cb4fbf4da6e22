pub mod table;
pub mod universe;

pub use table::*;
pub use universe::*;
