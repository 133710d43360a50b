pub mod lexer;
pub mod evaluator;

pub use lexer::*;
pub use evaluator::*;
