use anyhow::Result;
use stata_runner_core::ExitCode;
use std::path::{Path, PathBuf};

use super::session::{Prepared, prepare};
use crate::cli::StataArgs;
use crate::display::print_command_breakdown;

pub fn collect_command(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    args: &StataArgs,
) -> Result<ExitCode> {
    let Prepared { config, report, .. } = match prepare(paths, config_path, args)? {
        Ok(prepared) => prepared,
        Err(code) => return Ok(code),
    };

    println!("🔍 Collected {} task(s)", report.tasks.len());
    for task in &report.tasks {
        println!("\n📋 {}", task.id());
        let marks: Vec<&str> = task.marks.iter().map(|mark| mark.name.as_str()).collect();
        println!("   🏷️  marks: {:?}", marks);

        match task.function.preview(task) {
            Ok(Some(command)) => print_command_breakdown(&command, &config.platform),
            Ok(None) => {}
            // A missing executable only fails at setup; collection still succeeded.
            Err(e) => println!("   ⚠️  {e}"),
        }
    }

    Ok(ExitCode::Ok)
}
