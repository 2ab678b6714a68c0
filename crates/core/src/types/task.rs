use super::Node;
use crate::error::{Error, Result};
use crate::interfaces::TaskFunction;
use crate::marks::Mark;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Unique id of a task: `<path with forward slashes>::<name>`, or just the name without a path
pub fn task_id(path: Option<&Path>, name: &str) -> String {
    match path {
        Some(path) => format!("{}::{}", path.to_string_lossy().replace('\\', "/"), name),
        None => name.to_string(),
    }
}

/// A collected task, ready for the setup/execute/teardown phases
#[derive(Clone)]
pub struct Task {
    /// Name including the `[variant]` suffix of parametrized tasks
    pub name: String,
    /// File the task was declared in
    pub path: Option<PathBuf>,
    pub depends_on: BTreeMap<String, Node>,
    pub marks: Vec<Mark>,
    pub function: Arc<dyn TaskFunction>,
}

impl Task {
    pub fn new(name: impl Into<String>, path: Option<PathBuf>, function: Arc<dyn TaskFunction>) -> Self {
        Self {
            name: name.into(),
            path,
            depends_on: BTreeMap::new(),
            marks: Vec::new(),
            function,
        }
    }

    pub fn with_dependency(mut self, key: impl Into<String>, node: Node) -> Self {
        self.depends_on.insert(key.into(), node);
        self
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Name without the `[variant]` suffix
    pub fn base_name(&self) -> &str {
        self.name
            .split_once('[')
            .map_or(self.name.as_str(), |(base, _)| base)
    }

    pub fn id(&self) -> String {
        task_id(self.path.as_deref(), &self.name)
    }

    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.iter().any(|mark| mark.name == name)
    }

    /// Look up a dependency the collector is expected to have wired
    pub fn dependency(&self, key: &str) -> Result<&Node> {
        self.depends_on
            .get(key)
            .ok_or_else(|| Error::Other(format!("Task {} has no '{key}' dependency", self.id())))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("depends_on", &self.depends_on)
            .field("marks", &self.marks)
            .finish_non_exhaustive()
    }
}
