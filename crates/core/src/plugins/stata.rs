//! The Stata plugin
//!
//! Collects tasks carrying a `stata` mark, runs their do-file in batch mode and checks the log
//! afterwards, since Stata itself always exits with code 0.

use crate::{
    command::{StataCommand, build_command},
    config::{ConfigMap, MARKERS_KEY, PLATFORM_KEY, StataConfig},
    error::{Error, Result},
    interfaces::{CollectContext, HostPlugin, PluginMetadata, TaskFunction},
    marks::{
        Mark, MarkArg, MarkStore, OPTIONS_KEY, SCRIPT_SUFFIX, STATA_MARK, merge_marks,
        parse_stata_mark,
    },
    platform::{Platform, candidate_executables, discover_executable},
    runner::{LogLocation, LogVerifier, ensure_executable, run_command},
    types::{Node, NodeInfo, NodeValue, Task, task_id},
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SCRIPT_NODE: &str = "_script";
pub const OPTIONS_NODE: &str = "_options";
pub const EXECUTABLE_NODE: &str = "_executable";
pub const CWD_NODE: &str = "_cwd";

const MARKER_DESCRIPTION: &str = "Tasks which are executed with Stata.";

/// Plugin that runs do-files with Stata
#[derive(Debug, Clone, Default)]
pub struct StataPlugin;

impl StataPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl HostPlugin for StataPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "stata".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: Some("Execute do-files with Stata".to_string()),
            markers: vec![(STATA_MARK.to_string(), MARKER_DESCRIPTION.to_string())],
        }
    }

    fn parse_config(&self, config: &mut ConfigMap) -> Result<()> {
        match config
            .entry(MARKERS_KEY)
            .or_insert_with(|| Value::Object(ConfigMap::new()))
        {
            Value::Object(markers) => {
                markers.insert(
                    STATA_MARK.to_string(),
                    Value::String(MARKER_DESCRIPTION.to_string()),
                );
            }
            other => {
                return Err(Error::ConfigError(format!(
                    "'markers' must be an object, got {other}"
                )));
            }
        }

        if config.get(PLATFORM_KEY).is_none_or(Value::is_null) {
            config.insert(
                PLATFORM_KEY.to_string(),
                Value::String(Platform::current().identifier().to_string()),
            );
        }

        let mut stata = StataConfig::from_map(config)?;
        if stata.stata.is_none() {
            stata.stata = discover_executable(&stata.platform);
            match stata.stata {
                Some(ref executable) => info!("Using Stata executable {}", executable),
                None => debug!(
                    "No Stata executable found on PATH, looked for {:?}",
                    candidate_executables(&stata.platform)
                ),
            }
        }
        stata.write_to(config);

        Ok(())
    }

    fn parametrize_kwarg_to_marker(
        &self,
        kwargs: &mut BTreeMap<String, Value>,
        marks: &mut Vec<Mark>,
    ) -> Result<()> {
        let Some(value) = kwargs.remove(STATA_MARK) else {
            return Ok(());
        };

        let variant = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => Mark {
                name: STATA_MARK.to_string(),
                args: Vec::new(),
                kwargs: serde_json::from_value(Value::Object(map))?,
            },
            options => {
                let options: MarkArg = serde_json::from_value(options)?;
                Mark::new(STATA_MARK).with_kwarg(OPTIONS_KEY, options)
            }
        };

        let existing: Vec<usize> = marks
            .iter()
            .enumerate()
            .filter(|(_, mark)| mark.name == STATA_MARK)
            .map(|(index, _)| index)
            .collect();

        match existing.as_slice() {
            [index] => {
                marks[*index] = merge_marks(&[marks[*index].clone(), variant])?;
            }
            // None to merge with, or already ambiguous; collection reports the duplicates.
            _ => marks.push(variant),
        }

        Ok(())
    }

    fn collect_task(
        &self,
        context: &CollectContext<'_>,
        path: &Path,
        name: &str,
        marks: &mut MarkStore,
    ) -> Result<Option<Task>> {
        let id = task_id(Some(path), name);
        if !marks.has_mark(&id, STATA_MARK) {
            return Ok(None);
        }

        let mut stata_marks = marks.remove_marks(&id, STATA_MARK);
        if stata_marks.len() > 1 {
            return Err(Error::DuplicateAnnotation(id));
        }
        let Some(mark) = stata_marks.pop() else {
            return Ok(None);
        };
        let annotation = parse_stata_mark(&mark)?;
        let config = StataConfig::from_map(context.config)?;

        // Absolute, so the collector resolves the script against it once and the cwd node
        // passes through unchanged.
        let root = std::path::absolute(
            path.parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new(".")),
        )?;

        let collect = |arg_name: &str, value: NodeValue| {
            context
                .nodes
                .collect_node(&root, NodeInfo::new(arg_name, value, Some(path), name))
        };

        let script = collect(SCRIPT_NODE, NodeValue::Path(annotation.script.clone()))?;
        let is_do_file = script
            .path()
            .and_then(Path::extension)
            .is_some_and(|suffix| suffix == SCRIPT_SUFFIX);
        if !is_do_file {
            return Err(Error::InvalidScriptType(match script.path() {
                Some(path) => path.display().to_string(),
                None => script.to_string(),
            }));
        }

        let options = collect(OPTIONS_NODE, NodeValue::List(annotation.options.clone()))?;
        let executable = collect(
            EXECUTABLE_NODE,
            config.stata.clone().map_or(NodeValue::Null, NodeValue::Text),
        )?;
        let cwd = collect(CWD_NODE, NodeValue::Path(root.clone()))?;

        let mut task_marks = marks.take_all(&id);
        task_marks.push(annotation.to_mark());

        debug!("Collected Stata task {}", id);

        let function = RunDoFile {
            platform: config.platform,
        };
        let task = Task::new(name, Some(path.to_path_buf()), Arc::new(function))
            .with_dependency(SCRIPT_NODE, script)
            .with_dependency(OPTIONS_NODE, options)
            .with_dependency(EXECUTABLE_NODE, executable)
            .with_dependency(CWD_NODE, cwd)
            .with_marks(task_marks);

        Ok(Some(task))
    }

    fn execute_task_setup(&self, config: &ConfigMap, task: &Task) -> Result<()> {
        if !task.has_mark(STATA_MARK) {
            return Ok(());
        }
        ensure_executable(&StataConfig::from_map(config)?)?;
        Ok(())
    }

    fn execute_task_teardown(&self, config: &ConfigMap, task: &Task) -> Result<()> {
        if !task.has_mark(STATA_MARK) {
            return Ok(());
        }
        let config = StataConfig::from_map(config)?;
        let script = script_path(task)?;
        let location =
            LogLocation::resolve(&config.platform, script, task.path.as_deref(), &task.id());

        let result =
            LogVerifier::new(config.check_log_lines, config.keep_log).verify(&location);
        if let Err(ref err) = result {
            warn!("Log check failed for {}: {}", task.id(), location.path().display());
            debug!("{err}");
        }
        result
    }
}

/// Task function of every Stata task
#[derive(Debug, Clone)]
pub struct RunDoFile {
    platform: Platform,
}

impl RunDoFile {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn command(&self, task: &Task) -> Result<StataCommand> {
        let executable = match task.dependency(EXECUTABLE_NODE)?.load() {
            NodeValue::Text(executable) => executable,
            _ => {
                return Err(Error::ToolNotFound {
                    candidates: candidate_executables(&self.platform)
                        .iter()
                        .map(|candidate| candidate.to_string())
                        .collect(),
                });
            }
        };

        let options = match task.dependency(OPTIONS_NODE)?.load() {
            NodeValue::List(options) => options,
            NodeValue::Null => Vec::new(),
            NodeValue::Text(option) => vec![option],
            NodeValue::Path(path) => vec![path.display().to_string()],
        };

        let mut command = build_command(
            &executable,
            script_path(task)?,
            &options,
            &self.platform,
            &task.id(),
        );
        if let Some(cwd) = task.dependency(CWD_NODE).ok().and_then(Node::path) {
            command = command.with_working_dir(cwd);
        }
        Ok(command)
    }
}

impl TaskFunction for RunDoFile {
    fn call(&self, task: &Task) -> Result<()> {
        run_command(&self.command(task)?)
    }

    fn preview(&self, task: &Task) -> Result<Option<StataCommand>> {
        self.command(task).map(Some)
    }
}

fn script_path(task: &Task) -> Result<&Path> {
    task.dependency(SCRIPT_NODE)?.path().ok_or_else(|| {
        Error::InvalidScriptType(format!("a value instead of a path in task {}", task.id()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHECK_LOG_LINES_KEY, STATA_KEY, default_config_map};
    use crate::marks::{OptionValue, TASK_MARK};
    use crate::services::DefaultNodeCollector;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn linux_config(stata: Option<&str>) -> ConfigMap {
        let mut config = default_config_map();
        config.insert(PLATFORM_KEY.to_string(), json!("linux"));
        config.insert(STATA_KEY.to_string(), json!(stata));
        config
    }

    fn collect(
        config: &ConfigMap,
        path: &Path,
        name: &str,
        marks: Vec<Mark>,
    ) -> Result<Option<Task>> {
        let mut store = MarkStore::new();
        store.extend(&task_id(Some(path), name), marks);
        let context = CollectContext {
            config,
            nodes: &DefaultNodeCollector,
        };
        StataPlugin::new().collect_task(&context, path, name, &mut store)
    }

    fn stata_mark(script: &str) -> Mark {
        Mark::new(STATA_MARK).with_kwarg("script", script)
    }

    #[test]
    fn test_parse_config_registers_marker_and_normalizes() {
        let mut config = default_config_map();
        config.insert(PLATFORM_KEY.to_string(), json!("plan9"));
        config.insert(CHECK_LOG_LINES_KEY.to_string(), json!("10"));

        StataPlugin::new().parse_config(&mut config).unwrap();

        assert_eq!(config[MARKERS_KEY][STATA_MARK], json!(MARKER_DESCRIPTION));
        assert_eq!(config[CHECK_LOG_LINES_KEY], json!(10));
        // No candidates exist for an unknown platform, so discovery finds nothing.
        assert_eq!(config[STATA_KEY], Value::Null);
    }

    #[test]
    fn test_parse_config_rejects_invalid_lines() {
        for value in [json!(0), json!(-1), json!("-1"), json!("abc"), json!(1.5)] {
            let mut config = default_config_map();
            config.insert(CHECK_LOG_LINES_KEY.to_string(), value);
            let result = StataPlugin::new().parse_config(&mut config);
            assert!(matches!(result, Err(Error::ConfigError(_))));
        }
    }

    #[test]
    fn test_variant_options_merge_with_base_mark() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert(STATA_MARK.to_string(), json!(["0.dta"]));
        kwargs.insert("other".to_string(), json!(1));
        let mut marks = vec![Mark::new(TASK_MARK), stata_mark("script.do")];

        StataPlugin::new()
            .parametrize_kwarg_to_marker(&mut kwargs, &mut marks)
            .unwrap();

        assert_eq!(kwargs.keys().collect::<Vec<_>>(), vec!["other"]);
        assert_eq!(marks.len(), 2);
        let annotation = parse_stata_mark(&marks[1]).unwrap();
        assert_eq!(annotation.script, PathBuf::from("script.do"));
        assert_eq!(annotation.options, vec!["0.dta"]);
    }

    #[test]
    fn test_variant_object_becomes_mark() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert(
            STATA_MARK.to_string(),
            json!({"script": "other.do", "options": "x"}),
        );
        let mut marks = Vec::new();

        StataPlugin::new()
            .parametrize_kwarg_to_marker(&mut kwargs, &mut marks)
            .unwrap();

        assert_eq!(
            marks,
            vec![
                Mark::new(STATA_MARK)
                    .with_kwarg("options", "x")
                    .with_kwarg("script", "other.do")
            ]
        );
    }

    #[test]
    fn test_collect_wires_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        let task_file = temp_dir.path().join("task_example.json");
        fs::write(temp_dir.path().join("script.do"), "sysuse auto\n").unwrap();
        let config = linux_config(Some("stata"));

        let mark = stata_mark("script.do").with_kwarg(
            "options",
            vec![OptionValue::from("out.dta"), OptionValue::Integer(3)],
        );
        let task = collect(&config, &task_file, "task_example", vec![mark, Mark::new("skip")])
            .unwrap()
            .unwrap();

        assert_eq!(
            task.dependency(SCRIPT_NODE).unwrap().path(),
            Some(temp_dir.path().join("script.do").as_path())
        );
        assert_eq!(
            task.dependency(OPTIONS_NODE).unwrap().load(),
            NodeValue::List(vec!["out.dta".to_string(), "3".to_string()])
        );
        assert_eq!(
            task.dependency(EXECUTABLE_NODE).unwrap().load(),
            NodeValue::Text("stata".to_string())
        );
        assert_eq!(task.marks.len(), 2);
        assert_eq!(task.marks[0].name, "skip");
        assert!(task.has_mark(STATA_MARK));

        let command = task.function.preview(&task).unwrap().unwrap();
        assert_eq!(
            command.args,
            vec![
                "stata".to_string(),
                "-e".to_string(),
                "do".to_string(),
                temp_dir.path().join("script.do").display().to_string(),
                "out.dta".to_string(),
                "3".to_string(),
            ]
        );
        assert_eq!(command.working_dir(), Some(temp_dir.path()));
    }

    #[test]
    fn test_relative_task_file_resolves_from_its_directory() {
        let config = linux_config(Some("stata"));
        let task_file = Path::new("analysis/task_example.json");

        let task = collect(&config, task_file, "task_example", vec![stata_mark("script.do")])
            .unwrap()
            .unwrap();

        let task_dir = std::env::current_dir().unwrap().join("analysis");
        assert_eq!(
            task.dependency(SCRIPT_NODE).unwrap().path(),
            Some(task_dir.join("script.do").as_path())
        );
        assert_eq!(
            task.dependency(CWD_NODE).unwrap().path(),
            Some(task_dir.as_path())
        );
    }

    #[test]
    fn test_collect_ignores_other_tasks() {
        let config = linux_config(Some("stata"));
        let task = collect(
            &config,
            Path::new("/p/task_a.json"),
            "task_a",
            vec![Mark::new(TASK_MARK)],
        )
        .unwrap();
        assert!(task.is_none());
    }

    #[test]
    fn test_collect_rejects_duplicates_and_bad_scripts() {
        let config = linux_config(Some("stata"));
        let path = Path::new("/p/task_a.json");

        let err = collect(
            &config,
            path,
            "task_a",
            vec![stata_mark("a.do"), stata_mark("b.do")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateAnnotation(id) if id == "/p/task_a.json::task_a"));

        let err = collect(&config, path, "task_a", vec![stata_mark("script.py")]).unwrap_err();
        assert!(matches!(err, Error::InvalidScriptType(_)));

        let err = collect(&config, path, "task_a", vec![Mark::new(STATA_MARK)]).unwrap_err();
        assert!(matches!(err, Error::InvalidAnnotation(_)));
    }

    #[test]
    fn test_setup_requires_executable() {
        let config = linux_config(None);
        let task = collect(
            &config,
            Path::new("/p/task_a.json"),
            "task_a",
            vec![stata_mark("a.do")],
        )
        .unwrap()
        .unwrap();

        let err = StataPlugin::new()
            .execute_task_setup(&config, &task)
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { candidates } if candidates.len() == 3));
    }

    #[test]
    fn test_teardown_checks_log_beside_script() {
        let temp_dir = TempDir::new().unwrap();
        let task_file = temp_dir.path().join("task_example.json");
        fs::write(temp_dir.path().join("script.do"), "").unwrap();
        let config = linux_config(Some("stata"));
        let task = collect(&config, &task_file, "task_example", vec![stata_mark("script.do")])
            .unwrap()
            .unwrap();

        let err = StataPlugin::new()
            .execute_task_teardown(&config, &task)
            .unwrap_err();
        assert!(matches!(err, Error::LogNotFound(_)));

        fs::write(temp_dir.path().join("script.log"), "end of do-file\n").unwrap();
        StataPlugin::new()
            .execute_task_teardown(&config, &task)
            .unwrap();

        fs::write(temp_dir.path().join("script.log"), "r(601);\n").unwrap();
        let err = StataPlugin::new()
            .execute_task_teardown(&config, &task)
            .unwrap_err();
        assert!(matches!(err, Error::ToolRuntimeError { .. }));
        assert!(!temp_dir.path().join("script.log").exists());
    }
}
