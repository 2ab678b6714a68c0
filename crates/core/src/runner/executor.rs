//! Preflight check and synchronous execution of a Stata command

use crate::{
    command::StataCommand,
    config::StataConfig,
    error::{Error, Result},
    platform::candidate_executables,
};
use tracing::{debug, info};

/// Return the configured executable, or fail before anything is launched
pub fn ensure_executable(config: &StataConfig) -> Result<&str> {
    config.stata.as_deref().ok_or_else(|| Error::ToolNotFound {
        candidates: candidate_executables(&config.platform)
            .iter()
            .map(|candidate| candidate.to_string())
            .collect(),
    })
}

/// Run `command` to completion.
///
/// Stata reports most errors only in its log, so a non-zero exit here means the tool itself
/// crashed; the captured output is attached to the error.
pub fn run_command(command: &StataCommand) -> Result<()> {
    let shell_cmd = command.to_shell_command();
    info!("Executing {}.", shell_cmd);
    if let Some(dir) = command.working_dir() {
        debug!("Working directory: {}", dir.display());
    }

    let output = command.execute()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    for line in stdout.lines() {
        debug!(target: "stata", "{}", line);
    }

    if !output.status.success() {
        let mut captured = stdout.into_owned();
        if !stderr.trim().is_empty() {
            if !captured.is_empty() && !captured.ends_with('\n') {
                captured.push('\n');
            }
            captured.push_str(&stderr);
        }
        return Err(Error::ProcessFailed {
            command: shell_cmd,
            code: output.status.code(),
            output: captured,
        });
    }

    Ok(())
}
