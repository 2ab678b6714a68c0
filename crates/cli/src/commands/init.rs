use anyhow::{Context, Result};
use stata_runner_core::{ExitCode, config::CONFIG_FILE_NAMES};
use std::{env, path::Path, path::PathBuf};
use tracing::info;

use crate::config::{create_default_config, example_task_file};

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<ExitCode> {
    // Determine the project root
    let project_root = match cwd {
        Some(cwd) => PathBuf::from(cwd),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    let project_root = project_root
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(ExitCode::Ok);
    }

    println!(
        "🚀 Initializing stata-runner in: {}",
        project_root.display()
    );

    let config = create_default_config();
    match config.stata {
        Some(ref stata) => println!("🔎 Found Stata executable: {}", stata),
        None => println!("⚠️  No Stata executable found on PATH, set 'stata' by hand"),
    }

    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Wrote {}", config_path.display());

    println!("✅ Created config: {}", config_path.display());
    println!("\n📌 Declare tasks in task_*.json files, for example:");
    println!("{}", example_task_file());

    Ok(ExitCode::Ok)
}
