use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use stata_runner_core::ExitCode;
use std::path::PathBuf;

use crate::commands::{build_command, collect_command, init_command};

/// Run Stata do-files as tasks
#[derive(Parser, Debug)]
#[command(name = "stata-runner")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Stata settings that can be given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct StataArgs {
    /// Name or path of the Stata executable
    #[arg(long = "stata")]
    pub stata: Option<String>,

    /// Keep the log of a failed task instead of deleting it
    #[arg(long = "stata-keep-log")]
    pub stata_keep_log: bool,

    /// Number of lines at the end of the log checked for errors [default: 10]
    #[arg(long = "stata-check-log-lines", value_parser = clap::value_parser!(u64).range(1..))]
    pub stata_check_log_lines: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect and run all Stata tasks
    Build {
        /// Task files or directories to search for task_*.json (defaults to current directory)
        paths: Vec<PathBuf>,

        /// Use this config file instead of searching for stata-runner.json
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        stata: StataArgs,

        /// Number of tasks run in parallel
        #[arg(short = 'n', long = "jobs", default_value_t = 1)]
        jobs: usize,

        /// Show commands without executing
        #[arg(short = 'd', long = "dry-run")]
        dry_run: bool,
    },
    /// Collect tasks and show how each would be run
    Collect {
        /// Task files or directories to search for task_*.json (defaults to current directory)
        paths: Vec<PathBuf>,

        /// Use this config file instead of searching for stata-runner.json
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        stata: StataArgs,
    },
    /// Write a stata-runner.json template
    Init {
        /// Custom working directory (defaults to current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<ExitCode> {
        match self {
            Commands::Build {
                paths,
                config,
                stata,
                jobs,
                dry_run,
            } => build_command(&paths, config.as_deref(), &stata, jobs, dry_run),
            Commands::Collect {
                paths,
                config,
                stata,
            } => collect_command(&paths, config.as_deref(), &stata),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
