pub mod types;

pub mod classify;
pub mod resolve;
pub mod tokenize;

pub use resolve::Program;
pub use tokenize::tokenize;
