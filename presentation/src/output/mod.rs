//! Console output

pub mod console;

pub use console::{ConsoleFormatter, EXAMPLE_QUESTIONS};
