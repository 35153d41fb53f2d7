mod instance;
mod mem;
mod types;

pub use instance::{Instance, State};
pub use types::{load_binary, load_decimal, LoadError, LogLevel};
