use anyhow::{Context, Result};
use stata_runner_core::ExitCode;
use std::path::{Path, PathBuf};
use tracing::info;

use super::session::{Prepared, prepare};
use crate::cli::StataArgs;
use crate::display::{print_command_breakdown, print_execution_report};

pub fn build_command(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    args: &StataArgs,
    jobs: usize,
    dry_run: bool,
) -> Result<ExitCode> {
    let Prepared {
        session,
        config,
        report,
    } = match prepare(paths, config_path, args)? {
        Ok(prepared) => prepared,
        Err(code) => return Ok(code),
    };

    if report.tasks.is_empty() {
        println!("🔍 No tasks collected");
        return Ok(ExitCode::Ok);
    }

    if dry_run {
        for task in &report.tasks {
            println!("📋 {}", task.id());
            if let Some(command) = task
                .function
                .preview(task)
                .with_context(|| format!("Failed to build the command of {}", task.id()))?
            {
                println!("   {}", command.to_shell_command());
                print_command_breakdown(&command, &config.platform);
            }
        }
        return Ok(ExitCode::Ok);
    }

    info!("Running {} task(s) on {} job(s)", report.tasks.len(), jobs);
    let execution = session.execute(&report.tasks, jobs)?;
    print_execution_report(&execution);

    Ok(execution.exit_code())
}
