use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Whether `path` names a task file, i.e. `task_*.json`
pub fn is_task_file(path: &Path) -> bool {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    file_name.starts_with("task_") && file_name.ends_with(".json")
}

/// Expand `paths` into task files.
///
/// Files are taken as given; directories are searched recursively, skipping hidden directories.
/// The result is sorted and free of duplicates. No paths means the current directory.
pub fn discover_task_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let default = [PathBuf::from(".")];
    let paths = if paths.is_empty() { &default[..] } else { paths };

    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            bail!("Path does not exist: {}", path.display());
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                // Skip hidden directories, but not the root itself
                e.depth() == 0
                    || !e
                        .file_name()
                        .to_str()
                        .is_some_and(|name| name.starts_with('.'))
            })
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_task_file(entry.path()) {
                debug!("Found task file {}", entry.path().display());
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
