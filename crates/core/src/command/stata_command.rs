use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// A fully built Stata invocation; `args[0]` is the executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StataCommand {
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl StataCommand {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = String::new();
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                cmd.push(' ');
            }
            if arg.contains(' ') {
                cmd.push_str(&format!("'{arg}'"));
            } else {
                cmd.push_str(arg);
            }
        }
        cmd
    }

    /// Run to completion, capturing stdout and stderr; the environment is inherited
    pub fn execute(&self) -> io::Result<Output> {
        let Some((program, args)) = self.args.split_first() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "No command specified",
            ));
        };

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_quotes_arguments_with_spaces() {
        let command = StataCommand::new(vec![
            "stata".to_string(),
            "-e".to_string(),
            "do".to_string(),
            "my scripts/clean.do".to_string(),
        ]);

        assert_eq!(command.to_shell_command(), "stata -e do 'my scripts/clean.do'");
        assert_eq!(command.program(), Some("stata"));
    }

    #[test]
    fn test_empty_command_fails_to_execute() {
        let err = StataCommand::new(Vec::new()).execute().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
