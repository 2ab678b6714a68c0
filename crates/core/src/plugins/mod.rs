//! Built-in plugins and the registry that dispatches to them

pub mod registry;
pub mod stata;

pub use registry::PluginRegistry;
pub use stata::{CWD_NODE, EXECUTABLE_NODE, OPTIONS_NODE, RunDoFile, SCRIPT_NODE, StataPlugin};
