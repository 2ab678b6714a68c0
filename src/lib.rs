//! Fixtures shared by the workspace integration tests
//!
//! A fake Stata executable that behaves like `stata -e do script.do`: it copies the do-file
//! into a log next to it (or into `<name>.log` in the working directory when given a trailing
//! `-<name>` argument), so a do-file containing `r(601);` yields a failing log.

use serde_json::{Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FAKE_STATA: &str = r#"#!/bin/sh
# usage: stata -e do <script> [options...] [-<log name>]
script="$3"
shift 3
log="${script%.do}.log"
for last in "$@"; do :; done
case "$last" in
    -*) log="${last#-}.log" ;;
esac
if [ -n "$STATA_FAKE_EXIT" ]; then
    echo "fake stata crashed" >&2
    exit "$STATA_FAKE_EXIT"
fi
echo "running $script $*"
cp "$script" "$log"
"#;

/// Write the fake executable into `dir` and return its path
#[cfg(unix)]
pub fn write_fake_stata(dir: &Path) -> io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("stata");
    fs::write(&path, FAKE_STATA)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// A `stata` mark as it appears in a task file
pub fn stata_mark(script: &str, options: &[&str]) -> Value {
    json!({"name": "stata", "kwargs": {"script": script, "options": options}})
}

/// Write `{"tasks": tasks}` to `dir/name`
pub fn write_task_file(dir: &Path, name: &str, tasks: Value) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, json!({ "tasks": tasks }).to_string())?;
    Ok(path)
}
