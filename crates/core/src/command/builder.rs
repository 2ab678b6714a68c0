//! Assemble the Stata batch-mode invocation for a task

use super::{StataCommand, resolve_log_name};
use crate::platform::Platform;
use std::path::Path;

/// Fixed flags that run a do-file in batch mode
pub const DO_FILE_FLAGS: [&str; 2] = ["-e", "do"];

/// Build `[executable, -e, do, script, *options]`, plus `-<log name>` where Stata's default log
/// name cannot be used.
pub fn build_command(
    executable: &str,
    script: &Path,
    options: &[String],
    platform: &Platform,
    task_id: &str,
) -> StataCommand {
    let mut args = Vec::with_capacity(4 + options.len() + 1);
    args.push(executable.to_string());
    args.extend(DO_FILE_FLAGS.iter().map(|flag| flag.to_string()));
    args.push(to_posix_string(script));
    args.extend(options.iter().cloned());

    if platform.requires_log_override() {
        args.push(format!("-{}", resolve_log_name(task_id)));
    }

    StataCommand::new(args)
}

/// Render a path with forward slashes
pub fn to_posix_string(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if cfg!(windows) {
        rendered.replace('\\', "/")
    } else {
        rendered.into_owned()
    }
}
