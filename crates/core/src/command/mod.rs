//! Stata command generation

pub mod builder;
pub mod log_name;
pub mod stata_command;

// Re-export commonly used items
pub use builder::{DO_FILE_FLAGS, build_command, to_posix_string};
pub use log_name::resolve_log_name;
pub use stata_command::StataCommand;
