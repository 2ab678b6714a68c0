//! Task file parsing and expansion

pub mod task_file;

pub use task_file::{TASK_PREFIX, TaskDefinition, TaskFile, TaskInstance, Variant};
