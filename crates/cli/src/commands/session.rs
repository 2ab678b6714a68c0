use anyhow::Result;
use stata_runner_core::{
    ExitCode, PluginRegistry, Session, StataConfig, session::CollectionReport,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::StataArgs;
use crate::config::load_config;
use crate::display::print_collection_errors;
use crate::utils::discover_task_files;

/// A configured session with everything it collected
pub struct Prepared {
    pub session: Session,
    pub config: StataConfig,
    pub report: CollectionReport,
}

/// Configure a session and collect the tasks below `paths`.
///
/// Returns the exit code to stop with when configuration or collection fails; the errors have
/// already been printed then.
pub fn prepare(
    paths: &[PathBuf],
    config_path: Option<&Path>,
    args: &StataArgs,
) -> Result<std::result::Result<Prepared, ExitCode>> {
    let session = match load_config(paths, config_path, args).and_then(|config| {
        Ok(Session::new(config, PluginRegistry::with_defaults())?)
    }) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ Configuration failed: {e:#}");
            return Ok(Err(ExitCode::ConfigurationFailed));
        }
    };
    let config = StataConfig::from_map(session.config())?;

    let files = match discover_task_files(paths) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("❌ Collection failed: {e:#}");
            return Ok(Err(ExitCode::CollectionFailed));
        }
    };
    debug!("Collecting from {} task file(s)", files.len());

    let report = session.collect(&files);
    if !report.is_success() {
        print_collection_errors(&report);
        return Ok(Err(ExitCode::CollectionFailed));
    }

    Ok(Ok(Prepared {
        session,
        config,
        report,
    }))
}
