pub mod discovery;

pub use discovery::{discover_task_files, is_task_file};
