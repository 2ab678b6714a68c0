//! Post-run check of Stata log files
//!
//! Stata exits with code 0 even when a do-file fails. The real error code is only written to
//! the log, as a line starting with `r(<code>)`, e.g. `r(601);`.

use crate::{
    command::resolve_log_name,
    error::{Error, Result},
    platform::Platform,
};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

fn error_sentinel() -> &'static Regex {
    static SENTINEL: OnceLock<Regex> = OnceLock::new();
    SENTINEL.get_or_init(|| Regex::new(r"^r\(([0-9]+)\)").expect("sentinel pattern is valid"))
}

/// Where Stata leaves the log of a do-file run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLocation {
    /// Next to the script, same stem, `.log` suffix
    BesideScript(PathBuf),
    /// Next to the task file, named after the flattened task id
    BesideTask(PathBuf),
}

impl LogLocation {
    /// Compute the location with the same name resolution the command builder uses
    pub fn resolve(
        platform: &Platform,
        script: &Path,
        task_path: Option<&Path>,
        task_id: &str,
    ) -> Self {
        if platform.requires_log_override() {
            let dir = task_path
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
            LogLocation::BesideTask(dir.join(format!("{}.log", resolve_log_name(task_id))))
        } else {
            LogLocation::BesideScript(script.with_extension("log"))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            LogLocation::BesideScript(path) | LogLocation::BesideTask(path) => path,
        }
    }
}

/// An error code found in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelMatch {
    /// Index into the examined tail
    pub line: usize,
    pub code: u32,
}

/// Progress of one verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyState {
    Pending,
    Located(PathBuf),
    Scanned {
        path: PathBuf,
        tail: Vec<String>,
        found: Option<SentinelMatch>,
    },
    Passed,
    Failed,
}

/// Checks the tail of a log for Stata error codes
#[derive(Debug, Clone)]
pub struct LogVerifier {
    check_log_lines: usize,
    keep_log: bool,
    state: VerifyState,
}

impl LogVerifier {
    pub fn new(check_log_lines: usize, keep_log: bool) -> Self {
        Self {
            check_log_lines,
            keep_log,
            state: VerifyState::Pending,
        }
    }

    pub fn state(&self) -> &VerifyState {
        &self.state
    }

    /// Run all stages: locate, scan, then pass or fail
    pub fn verify(&mut self, location: &LogLocation) -> Result<()> {
        self.locate(location)?;
        self.scan()?;
        self.conclude()
    }

    fn locate(&mut self, location: &LogLocation) -> Result<()> {
        let path = location.path();
        if !path.is_file() {
            self.state = VerifyState::Failed;
            return Err(Error::LogNotFound(path.to_path_buf()));
        }
        debug!("Checking log file {}", path.display());
        self.state = VerifyState::Located(path.to_path_buf());
        Ok(())
    }

    fn scan(&mut self) -> Result<()> {
        let VerifyState::Located(path) = &self.state else {
            return Err(Error::Other("log file must be located before scanning".to_string()));
        };
        let path = path.clone();

        let bytes = std::fs::read(&path)?;
        let log = String::from_utf8_lossy(&bytes);
        let tail = log_tail(&log, self.check_log_lines);
        let found = find_error(&tail);

        self.state = VerifyState::Scanned { path, tail, found };
        Ok(())
    }

    fn conclude(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, VerifyState::Pending);
        let VerifyState::Scanned { path, tail, found } = state else {
            self.state = state;
            return Err(Error::Other("log file must be scanned before concluding".to_string()));
        };

        match found {
            None => {
                self.state = VerifyState::Passed;
                Ok(())
            }
            Some(found) => {
                debug!("Found Stata error r({}) in {}", found.code, path.display());
                if !self.keep_log {
                    std::fs::remove_file(&path)?;
                }
                self.state = VerifyState::Failed;
                Err(Error::ToolRuntimeError {
                    n_lines: self.check_log_lines,
                    tail,
                })
            }
        }
    }
}

/// The last `n_lines` pieces of `log` split on `\n`; a trailing newline counts as an empty line
pub fn log_tail(log: &str, n_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = log.split('\n').collect();
    let start = lines.len().saturating_sub(n_lines);
    lines[start..].iter().map(|line| line.to_string()).collect()
}

/// Whether `line` starts with a Stata error code such as `r(601)`
pub fn is_error_line(line: &str) -> bool {
    error_sentinel().is_match(line)
}

/// First line, top to bottom, that carries an error code
pub fn find_error(lines: &[String]) -> Option<SentinelMatch> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let captures = error_sentinel().captures(line)?;
        let code = captures[1].parse().unwrap_or(u32::MAX);
        Some(SentinelMatch { line: index, code })
    })
}
