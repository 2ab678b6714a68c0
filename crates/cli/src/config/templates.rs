use serde_json::json;
use stata_runner_core::{
    Platform,
    config::{ConfigFile, DEFAULT_CHECK_LOG_LINES},
    platform::discover_executable,
};

/// Template written by `init`, pre-filled with the Stata found on this machine
pub fn create_default_config() -> ConfigFile {
    create_config_for(&Platform::current(), discover_executable(&Platform::current()))
}

pub fn create_config_for(platform: &Platform, stata: Option<String>) -> ConfigFile {
    ConfigFile {
        stata,
        stata_keep_log: Some(false),
        stata_check_log_lines: Some(json!(DEFAULT_CHECK_LOG_LINES)),
        // Only worth pinning where the log name differs from Stata's default
        platform: platform
            .requires_log_override()
            .then(|| platform.identifier().to_string()),
    }
}

/// Example task file shown after `init`
pub fn example_task_file() -> &'static str {
    r#"{
  "tasks": [
    {
      "name": "task_clean_data",
      "marks": [
        {"name": "stata", "kwargs": {"script": "clean_data.do", "options": ["raw.dta"]}}
      ]
    }
  ]
}"#
}
