//! Configuration management for stata-runner

pub mod merge;
pub mod settings;
pub mod validation;

// Re-export main types
pub use merge::{ConfigMerger, layer_from_pairs};
pub use settings::{CONFIG_FILE_NAMES, ConfigFile};
pub use validation::{coerce_check_log_lines, coerce_keep_log};

use crate::{
    error::{Error, Result},
    platform::Platform,
};
use serde_json::{Value, json};

/// Configuration shared by the host and all plugins
pub type ConfigMap = serde_json::Map<String, Value>;

pub const STATA_KEY: &str = "stata";
pub const PLATFORM_KEY: &str = "platform";
pub const KEEP_LOG_KEY: &str = "stata_keep_log";
pub const CHECK_LOG_LINES_KEY: &str = "stata_check_log_lines";
pub const MARKERS_KEY: &str = "markers";

pub const DEFAULT_CHECK_LOG_LINES: usize = 10;

/// Built-in defaults, the lowest config layer
pub fn default_config_map() -> ConfigMap {
    let mut map = ConfigMap::new();
    map.insert(STATA_KEY.to_string(), Value::Null);
    map.insert(KEEP_LOG_KEY.to_string(), Value::Bool(false));
    map.insert(CHECK_LOG_LINES_KEY.to_string(), json!(DEFAULT_CHECK_LOG_LINES));
    map.insert(MARKERS_KEY.to_string(), Value::Object(ConfigMap::new()));
    map
}

/// Typed view on the Stata keys of the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StataConfig {
    /// Executable to run, `None` when Stata was not found
    pub stata: Option<String>,
    pub platform: Platform,
    pub keep_log: bool,
    pub check_log_lines: usize,
}

impl Default for StataConfig {
    fn default() -> Self {
        Self {
            stata: None,
            platform: Platform::current(),
            keep_log: false,
            check_log_lines: DEFAULT_CHECK_LOG_LINES,
        }
    }
}

impl StataConfig {
    /// Read and validate the Stata keys; missing keys take their defaults
    pub fn from_map(map: &ConfigMap) -> Result<Self> {
        let stata = match map.get(STATA_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.trim().is_empty() => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                return Err(Error::ConfigError(format!(
                    "'stata' must be the name or path of an executable, got {other}"
                )));
            }
        };

        let platform = match map.get(PLATFORM_KEY) {
            None | Some(Value::Null) => Platform::current(),
            Some(Value::String(identifier)) => Platform::from_identifier(identifier),
            Some(other) => {
                return Err(Error::ConfigError(format!(
                    "'platform' must be a string such as \"linux\", got {other}"
                )));
            }
        };

        let keep_log = map
            .get(KEEP_LOG_KEY)
            .map(coerce_keep_log)
            .transpose()?
            .unwrap_or(false);

        let check_log_lines = map
            .get(CHECK_LOG_LINES_KEY)
            .map(coerce_check_log_lines)
            .transpose()?
            .unwrap_or(DEFAULT_CHECK_LOG_LINES);

        Ok(Self {
            stata,
            platform,
            keep_log,
            check_log_lines,
        })
    }

    /// Write the normalized values back into `map`
    pub fn write_to(&self, map: &mut ConfigMap) {
        map.insert(
            STATA_KEY.to_string(),
            self.stata.clone().map(Value::String).unwrap_or(Value::Null),
        );
        map.insert(
            PLATFORM_KEY.to_string(),
            Value::String(self.platform.identifier().to_string()),
        );
        map.insert(KEEP_LOG_KEY.to_string(), Value::Bool(self.keep_log));
        map.insert(CHECK_LOG_LINES_KEY.to_string(), json!(self.check_log_lines));
    }
}
