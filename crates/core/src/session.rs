//! Reference host session
//!
//! Drives the plugin lifecycle: configure once, collect task files, then run every task
//! through setup, its function and teardown. Failures are recorded per task and never stop
//! other tasks.

use crate::{
    collect::{TaskFile, TaskInstance},
    config::ConfigMap,
    error::{Error, Result},
    interfaces::{CollectContext, NodeCollector},
    marks::MarkStore,
    plugins::PluginRegistry,
    services::DefaultNodeCollector,
    types::{Task, task_id},
};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Process exit status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Failed = 1,
    ConfigurationFailed = 2,
    CollectionFailed = 3,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Lifecycle phase a task failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Execute,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Execute => write!(f, "execute"),
            Phase::Teardown => write!(f, "teardown"),
        }
    }
}

/// A task definition that could not be turned into a task
#[derive(Debug)]
pub struct CollectionError {
    pub path: PathBuf,
    /// `None` when the whole file failed to load
    pub name: Option<String>,
    pub error: Error,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "{}: {}", task_id(Some(self.path.as_path()), name), self.error),
            None => write!(f, "{}: {}", self.path.display(), self.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct CollectionReport {
    pub tasks: Vec<Task>,
    pub errors: Vec<CollectionError>,
}

impl CollectionReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub enum TaskStatus {
    Success,
    Failed { phase: Phase, error: Error },
}

#[derive(Debug)]
pub struct TaskOutcome {
    pub task_id: String,
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TaskStatus::Success)
    }
}

#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// One outcome per task, in the order the tasks were given
    pub outcomes: Vec<TaskOutcome>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.failures().next().is_some() {
            ExitCode::Failed
        } else {
            ExitCode::Ok
        }
    }
}

/// A configured host holding the plugins and the merged configuration
pub struct Session {
    config: ConfigMap,
    registry: PluginRegistry,
    nodes: Arc<dyn NodeCollector>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Let every plugin validate and complete `config`.
    ///
    /// An error here maps to [`ExitCode::ConfigurationFailed`].
    pub fn new(mut config: ConfigMap, registry: PluginRegistry) -> Result<Self> {
        registry.parse_config(&mut config)?;
        debug!("Session configured with plugins {:?}", registry.names());
        Ok(Self {
            config,
            registry,
            nodes: Arc::new(DefaultNodeCollector::new()),
        })
    }

    pub fn with_node_collector(mut self, nodes: Arc<dyn NodeCollector>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Collect all tasks declared in `files`
    pub fn collect(&self, files: &[PathBuf]) -> CollectionReport {
        let mut report = CollectionReport::default();

        for path in files {
            // Ids, scripts and the working directory all derive from the task file location.
            let loaded = std::path::absolute(path)
                .map_err(Error::from)
                .and_then(|path| Ok((TaskFile::load(&path)?, path)));
            match loaded {
                Ok((file, path)) => self.collect_file(&path, &file, &mut report),
                Err(error) => {
                    warn!("Could not load task file {}: {}", path.display(), error);
                    report.errors.push(CollectionError {
                        path: path.clone(),
                        name: None,
                        error,
                    });
                }
            }
        }

        info!(
            "Collected {} task(s), {} error(s)",
            report.tasks.len(),
            report.errors.len()
        );
        report
    }

    fn collect_file(&self, path: &Path, file: &TaskFile, report: &mut CollectionReport) {
        let mut store = MarkStore::new();
        let context = CollectContext {
            config: &self.config,
            nodes: self.nodes.as_ref(),
        };

        for instance in file.instances() {
            let result = self
                .collect_instance(&context, path, &instance, &mut store)
                .and_then(|task| {
                    task.ok_or_else(|| {
                        Error::Other("no plugin knows how to run this task".to_string())
                    })
                });

            match result {
                Ok(task) => report.tasks.push(task),
                Err(error) => report.errors.push(CollectionError {
                    path: path.to_path_buf(),
                    name: Some(instance.name.clone()),
                    error,
                }),
            }
        }
    }

    fn collect_instance(
        &self,
        context: &CollectContext<'_>,
        path: &Path,
        instance: &TaskInstance<'_>,
        store: &mut MarkStore,
    ) -> Result<Option<Task>> {
        let mut marks = instance.definition.marks.clone();
        let mut kwargs = instance.kwargs.clone();
        self.registry
            .parametrize_kwarg_to_marker(&mut kwargs, &mut marks)?;
        if !kwargs.is_empty() {
            warn!(
                "Ignoring unused arguments {:?} of task {}",
                kwargs.keys().collect::<Vec<_>>(),
                instance.name
            );
        }

        store.extend(&task_id(Some(path), &instance.name), marks);
        self.registry
            .collect_task(context, path, &instance.name, store)
    }

    /// Run one task through all phases
    pub fn run_task(&self, task: &Task) -> TaskOutcome {
        let task_id = task.id();
        debug!("Running task {}", task_id);

        let status = match self.run_phases(task) {
            Ok(()) => {
                info!("Task {} succeeded", task_id);
                TaskStatus::Success
            }
            Err((phase, error)) => {
                warn!("Task {} failed during {}", task_id, phase);
                TaskStatus::Failed { phase, error }
            }
        };

        TaskOutcome { task_id, status }
    }

    fn run_phases(&self, task: &Task) -> std::result::Result<(), (Phase, Error)> {
        self.registry
            .execute_task_setup(&self.config, task)
            .map_err(|e| (Phase::Setup, e))?;
        task.function
            .call(task)
            .map_err(|e| (Phase::Execute, e))?;
        self.registry
            .execute_task_teardown(&self.config, task)
            .map_err(|e| (Phase::Teardown, e))
    }

    /// Run `tasks`, on `jobs` threads when more than one
    pub fn execute(&self, tasks: &[Task], jobs: usize) -> Result<ExecutionReport> {
        let outcomes: Vec<TaskOutcome> = if jobs <= 1 {
            tasks.iter().map(|task| self.run_task(task)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| Error::Other(format!("Failed to start {jobs} workers: {e}")))?;
            pool.install(|| tasks.par_iter().map(|task| self.run_task(task)).collect())
        };

        Ok(ExecutionReport { outcomes })
    }
}
