/// Convert a task id into the stem of the log file Stata writes for it.
///
/// Passing the whole task id to Stata does not work: it removes parent directories and cuts the
/// name at the double colons of parametrized tasks, e.g.
///
/// ```text
/// C:/task_example.json::task_example[arg1] -> task_example.log
/// ```
///
/// The id is therefore flattened starting from the task file name, found after the last `/`
/// since task ids always use forward slashes. Dots and double colons are replaced by
/// underscores and the angle brackets of generated task names removed. The `[variant]` suffix of parametrized tasks is kept so variants get distinct logs.
///
/// Tasks with the same file and task name in different directories flatten to the same stem and
/// share one log file.
///
/// ```
/// use stata_runner_core::command::resolve_log_name;
///
/// assert_eq!(
///     resolve_log_name("C:/task_example.py::task_example[arg1]"),
///     "task_example_py_task_example[arg1]"
/// );
/// ```
pub fn resolve_log_name(task_id: &str) -> String {
    let without_parents = task_id.rsplit('/').next().unwrap_or(task_id);

    without_parents
        .replace('.', "_")
        .replace("::", "_")
        .replace(['<', '>'], "")
}
