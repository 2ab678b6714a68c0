use super::{CHECK_LOG_LINES_KEY, ConfigMap, KEEP_LOG_KEY, PLATFORM_KEY, STATA_KEY};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File names searched for, in order, in every directory
pub const CONFIG_FILE_NAMES: [&str; 2] = ["stata-runner.json", ".stata-runner.json"];

/// Contents of a `stata-runner.json` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfigFile {
    /// Stata executable; discovered on the PATH when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stata_keep_log: Option<bool>,
    /// Kept raw so `"10"` and `10.0` can be coerced with a proper error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stata_check_log_lines: Option<Value>,
    /// Overrides the detected platform, e.g. `win32`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

impl ConfigFile {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start_path` to the first directory holding a config file
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = if start_path.is_file() {
            start_path.parent()?
        } else {
            start_path
        };

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// The keys this file sets, as a config layer
    pub fn to_layer(&self) -> ConfigMap {
        let mut layer = ConfigMap::new();
        if let Some(ref stata) = self.stata {
            layer.insert(STATA_KEY.to_string(), Value::String(stata.clone()));
        }
        if let Some(keep_log) = self.stata_keep_log {
            layer.insert(KEEP_LOG_KEY.to_string(), Value::Bool(keep_log));
        }
        if let Some(ref lines) = self.stata_check_log_lines {
            layer.insert(CHECK_LOG_LINES_KEY.to_string(), lines.clone());
        }
        if let Some(ref platform) = self.platform {
            layer.insert(PLATFORM_KEY.to_string(), Value::String(platform.clone()));
        }
        layer
    }
}
