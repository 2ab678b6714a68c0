use stata_runner_core::session::{CollectionReport, ExecutionReport, TaskStatus};

/// One line per collection error
pub fn format_collection_errors(report: &CollectionReport) -> Vec<String> {
    report
        .errors
        .iter()
        .map(|error| format!("❌ Could not collect {error}"))
        .collect()
}

/// Per-task outcome lines followed by a summary line
pub fn format_execution_report(report: &ExecutionReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.outcomes.len() + 1);

    for outcome in &report.outcomes {
        match outcome.status {
            TaskStatus::Success => lines.push(format!("✅ {}", outcome.task_id)),
            TaskStatus::Failed {
                ref phase,
                ref error,
            } => {
                lines.push(format!("❌ {} (failed during {})", outcome.task_id, phase));
                lines.extend(error.to_string().lines().map(|line| format!("   {line}")));
            }
        }
    }

    let failed = report.outcomes.len() - report.succeeded();
    lines.push(format!(
        "📊 {} succeeded, {} failed",
        report.succeeded(),
        failed
    ));
    lines
}

pub fn print_collection_errors(report: &CollectionReport) {
    for line in format_collection_errors(report) {
        eprintln!("{line}");
    }
}

pub fn print_execution_report(report: &ExecutionReport) {
    for line in format_execution_report(report) {
        println!("{line}");
    }
}
