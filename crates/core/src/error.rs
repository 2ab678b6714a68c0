use std::io;
use std::path::PathBuf;

/// Errors that can occur while collecting, running or checking Stata tasks
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid @stata mark: {0}")]
    InvalidAnnotation(String),

    #[error(
        "The 'script' keyword of the stata mark must point to a file with the .do suffix, \
         but it is {0}."
    )]
    InvalidScriptType(String),

    #[error("Task {0:?} has multiple stata marks, but only one is allowed.")]
    DuplicateAnnotation(String),

    #[error(
        "Stata is needed to run do-files, but it is not found on your PATH.\n\n\
         We are looking for one of {candidates:?} on your PATH. If you have a different \
         Stata executable, set 'stata' in stata-runner.json or pass --stata."
    )]
    ToolNotFound { candidates: Vec<String> },

    #[error("Command `{command}` exited with {}{}", describe_code(.code), describe_output(.output))]
    ProcessFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Log file not found at {}", .0.display())]
    LogNotFound(PathBuf),

    #[error("An error occurred. Here are the last {n_lines} lines of the log:\n\n{}", .tail.join("\n"))]
    ToolRuntimeError { n_lines: usize, tail: Vec<String> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn describe_output(output: &str) -> String {
    if output.trim().is_empty() {
        String::new()
    } else {
        format!(":\n\n{}", output.trim_end())
    }
}

/// Result type alias for stata-runner operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_lists_tail() {
        let error = Error::ToolRuntimeError {
            n_lines: 2,
            tail: vec!["r(601);".to_string(), "end of do-file".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "An error occurred. Here are the last 2 lines of the log:\n\nr(601);\nend of do-file"
        );
    }

    #[test]
    fn test_process_failed_without_output() {
        let error = Error::ProcessFailed {
            command: "stata -e do script.do".to_string(),
            code: Some(3),
            output: "  \n".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Command `stata -e do script.do` exited with exit code 3"
        );
    }
}
