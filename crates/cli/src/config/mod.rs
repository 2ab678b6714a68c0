pub mod templates;

pub use templates::{create_config_for, create_default_config, example_task_file};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use stata_runner_core::config::{
    CHECK_LOG_LINES_KEY, ConfigFile, ConfigMap, ConfigMerger, KEEP_LOG_KEY, STATA_KEY,
    layer_from_pairs,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::StataArgs;

/// Merge defaults, the config file and command line flags, in increasing precedence.
///
/// Without `explicit`, the config file is searched for upwards from the first path, or from
/// the current directory.
pub fn load_config(
    paths: &[PathBuf],
    explicit: Option<&Path>,
    args: &StataArgs,
) -> Result<ConfigMap> {
    let mut merger = ConfigMerger::new();

    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let start = match paths.first() {
                Some(path) => path.clone(),
                None => std::env::current_dir().context("Failed to get current directory")?,
            };
            ConfigFile::find_config_file(&start)
        }
    };

    if let Some(ref config_path) = config_path {
        debug!("Loading config from {}", config_path.display());
        let file = ConfigFile::load_from_file(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        merger.push_layer(config_path.display().to_string(), file.to_layer());
    }

    merger.push_layer("command line", cli_layer(args));
    debug!("Config sources: {:?}", merger.sources());

    Ok(merger.get_merged_config())
}

fn cli_layer(args: &StataArgs) -> ConfigMap {
    layer_from_pairs([
        (STATA_KEY, args.stata.clone().map(Value::String)),
        (KEEP_LOG_KEY, args.stata_keep_log.then_some(Value::Bool(true))),
        (
            CHECK_LOG_LINES_KEY,
            args.stata_check_log_lines.map(|lines| json!(lines)),
        ),
    ])
}
