//! stata-runner-core - Run Stata do-files as tasks
//!
//! This crate provides:
//! - Parsing and merging of `stata` marks into a canonical script and option list
//! - Building the batch-mode Stata command for a task and running it
//! - Checking the Stata log for error codes, since Stata always exits with code 0
//! - A small plugin host that collects task files and runs the task lifecycle
pub mod collect;
pub mod command;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod marks;
pub mod platform;
pub mod plugins;
pub mod runner;
pub mod services;
pub mod session;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use command::{StataCommand, build_command, resolve_log_name};
pub use config::{ConfigMap, StataConfig};
pub use marks::{Mark, MarkArg, OptionValue, TaskAnnotation, merge_marks, normalize};
pub use platform::Platform;
pub use plugins::{PluginRegistry, StataPlugin};
pub use runner::{LogLocation, LogVerifier};
pub use session::{ExitCode, Session};
