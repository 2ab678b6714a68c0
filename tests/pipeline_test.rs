//! End-to-end runs of the Stata plugin against a fake Stata executable
#![cfg(unix)]

use serde_json::json;
use stata_runner_core::config::{
    CHECK_LOG_LINES_KEY, ConfigMap, KEEP_LOG_KEY, PLATFORM_KEY, STATA_KEY, default_config_map,
};
use stata_runner_core::session::{ExecutionReport, Phase, TaskStatus};
use stata_runner_core::{Error, ExitCode, PluginRegistry, Session};
use stata_runner_workspace::{stata_mark, write_fake_stata, write_task_file};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config(stata: Option<&Path>, platform: &str) -> ConfigMap {
    let mut config = default_config_map();
    config.insert(PLATFORM_KEY.to_string(), json!(platform));
    config.insert(
        STATA_KEY.to_string(),
        json!(stata.map(|path| path.display().to_string())),
    );
    config
}

fn run(config: ConfigMap, task_file: &Path) -> ExecutionReport {
    let session = Session::new(config, PluginRegistry::with_defaults()).unwrap();
    let collected = session.collect(&[task_file.to_path_buf()]);
    assert!(collected.is_success(), "{:?}", collected.errors);
    session.execute(&collected.tasks, 2).unwrap()
}

#[test]
fn test_successful_do_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stata = write_fake_stata(root).unwrap();
    fs::write(root.join("script.do"), "sysuse auto\nsummarize\n").unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{"name": "task_example", "marks": [stata_mark("script.do", &[])]}]),
    )
    .unwrap();

    let report = run(config(Some(&stata), "linux"), &task_file);

    assert_eq!(report.exit_code(), ExitCode::Ok);
    assert_eq!(report.succeeded(), 1);
    assert!(root.join("script.log").exists());
}

#[test]
fn test_error_in_log_fails_task_and_removes_log() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stata = write_fake_stata(root).unwrap();
    fs::write(root.join("script.do"), "use missing.dta\nfile missing.dta not found\nr(601);\n")
        .unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{"name": "task_example", "marks": [stata_mark("script.do", &[])]}]),
    )
    .unwrap();

    let report = run(config(Some(&stata), "linux"), &task_file);

    assert_eq!(report.exit_code(), ExitCode::Failed);
    match &report.outcomes[0].status {
        TaskStatus::Failed {
            phase: Phase::Teardown,
            error: Error::ToolRuntimeError { tail, .. },
        } => assert!(tail.contains(&"r(601);".to_string())),
        other => panic!("unexpected status: {other:?}"),
    }
    assert!(!root.join("script.log").exists());
}

#[test]
fn test_keep_log_retains_failing_log() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stata = write_fake_stata(root).unwrap();
    fs::write(root.join("script.do"), "r(198);\n").unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{"name": "task_example", "marks": [stata_mark("script.do", &[])]}]),
    )
    .unwrap();
    let mut config = config(Some(&stata), "linux");
    config.insert(KEEP_LOG_KEY.to_string(), json!(true));

    let report = run(config, &task_file);

    assert_eq!(report.exit_code(), ExitCode::Failed);
    assert!(root.join("script.log").exists());
}

#[test]
fn test_error_before_checked_window_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stata = write_fake_stata(root).unwrap();
    fs::write(
        root.join("script.do"),
        "capture noisily use missing\nr(601);\ndisplay 1\ndisplay 2\ndisplay 3\n",
    )
    .unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{"name": "task_example", "marks": [stata_mark("script.do", &[])]}]),
    )
    .unwrap();
    let mut config = config(Some(&stata), "linux");
    config.insert(CHECK_LOG_LINES_KEY.to_string(), json!("3"));

    let report = run(config, &task_file);

    assert_eq!(report.exit_code(), ExitCode::Ok);
}

#[test]
fn test_parametrized_tasks_pass_their_options() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stata = write_fake_stata(root).unwrap();
    fs::write(root.join("script.do"), "args produces\n").unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{
            "name": "task_example",
            "marks": [stata_mark("script.do", &[])],
            "parametrize": [{"stata": ["0.dta"]}, {"stata": ["1.dta"]}]
        }]),
    )
    .unwrap();
    let session =
        Session::new(config(Some(&stata), "linux"), PluginRegistry::with_defaults()).unwrap();

    let collected = session.collect(&[task_file]);
    let names: Vec<&str> = collected.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["task_example[stata0]", "task_example[stata1]"]);

    let last_args: Vec<String> = collected
        .tasks
        .iter()
        .map(|task| task.function.preview(task).unwrap().unwrap().args[4].clone())
        .collect();
    assert_eq!(last_args, vec!["0.dta", "1.dta"]);

    let report = session.execute(&collected.tasks, 1).unwrap();
    assert_eq!(report.exit_code(), ExitCode::Ok);
}

#[test]
fn test_windows_log_name_is_shared_by_builder_and_verifier() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let stata = write_fake_stata(root).unwrap();
    fs::create_dir(root.join("src")).unwrap();
    fs::write(root.join("src").join("script.do"), "r(111);\n").unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{
            "name": "task_example",
            "marks": [stata_mark("src/script.do", &[])],
            "parametrize": [{"id": "a", "stata": []}]
        }]),
    )
    .unwrap();
    let mut config = config(Some(&stata), "win32");
    config.insert(KEEP_LOG_KEY.to_string(), json!(true));

    let report = run(config, &task_file);

    assert!(matches!(
        report.outcomes[0].status,
        TaskStatus::Failed {
            phase: Phase::Teardown,
            error: Error::ToolRuntimeError { .. }
        }
    ));
    assert!(root.join("task_example_json_task_example[a].log").exists());
    assert!(!root.join("src").join("script.log").exists());
}

#[test]
fn test_duplicate_stata_marks_fail_collection() {
    let temp_dir = TempDir::new().unwrap();
    let task_file = write_task_file(
        temp_dir.path(),
        "task_example.json",
        json!([{
            "name": "task_example",
            "marks": [stata_mark("a.do", &[]), stata_mark("b.do", &[])]
        }]),
    )
    .unwrap();
    let session =
        Session::new(config(Some(Path::new("stata")), "linux"), PluginRegistry::with_defaults())
            .unwrap();

    let collected = session.collect(&[task_file]);

    assert!(collected.tasks.is_empty());
    assert!(matches!(
        collected.errors[0].error,
        Error::DuplicateAnnotation(_)
    ));
}

#[test]
fn test_missing_stata_fails_before_launch() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("script.do"), "display 1\n").unwrap();
    let task_file = write_task_file(
        root,
        "task_example.json",
        json!([{"name": "task_example", "marks": [stata_mark("script.do", &[])]}]),
    )
    .unwrap();

    // No candidates exist for an unknown platform, so discovery cannot find anything.
    let report = run(config(None, "plan9"), &task_file);

    assert!(matches!(
        report.outcomes[0].status,
        TaskStatus::Failed {
            phase: Phase::Setup,
            error: Error::ToolNotFound { .. }
        }
    ));
    assert!(!root.join("script.log").exists());
}
