//! CLI engine: argument parsing, progress display, command handling.

pub mod arg_parser;
pub mod handlers;
pub mod progress;

pub use arg_parser::Cli;
pub use handlers::handle_run;
