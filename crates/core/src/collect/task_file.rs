//! Task files: JSON documents declaring tasks, their marks and parametrizations
//!
//! ```json
//! {
//!   "tasks": [
//!     {
//!       "name": "task_clean_data",
//!       "marks": [{"name": "stata", "kwargs": {"script": "clean.do"}}],
//!       "parametrize": [{"id": "small", "stata": ["small.dta"]}]
//!     }
//!   ]
//! }
//! ```

use crate::{error::Result, marks::Mark};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Prefix that makes a definition a task without a `task` mark
pub const TASK_PREFIX: &str = "task_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parametrize: Vec<Variant>,
}

/// One parametrized instance of a definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kwargs: BTreeMap<String, Value>,
}

impl Variant {
    /// The explicit id, or `<kwarg><index>` for every keyword joined with `-`
    pub fn resolved_id(&self, index: usize) -> String {
        match self.id {
            Some(ref id) => id.clone(),
            None if self.kwargs.is_empty() => index.to_string(),
            None => self
                .kwargs
                .keys()
                .map(|key| format!("{key}{index}"))
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

/// A definition expanded into one concrete task name
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInstance<'a> {
    pub name: String,
    pub definition: &'a TaskDefinition,
    pub kwargs: BTreeMap<String, Value>,
}

impl TaskDefinition {
    /// Whether the host should treat this definition as a task
    pub fn is_task(&self) -> bool {
        self.name.starts_with(TASK_PREFIX)
            || self.marks.iter().any(|mark| mark.name == crate::marks::TASK_MARK)
    }
}

impl TaskFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Expand every task definition into its instances.
    ///
    /// Parametrized definitions yield `name[id]`. A name declared more than once gets a
    /// positional `[i]` suffix on every occurrence so ids stay unique within the file.
    pub fn instances(&self) -> Vec<TaskInstance<'_>> {
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for definition in self.tasks.iter().filter(|d| d.is_task()) {
            *occurrences.entry(definition.name.as_str()).or_default() += 1;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut instances = Vec::new();

        for definition in self.tasks.iter().filter(|d| d.is_task()) {
            let position = seen.entry(definition.name.as_str()).or_default();
            let name = if occurrences[definition.name.as_str()] > 1 {
                format!("{}[{}]", definition.name, position)
            } else {
                definition.name.clone()
            };
            *position += 1;

            if definition.parametrize.is_empty() {
                instances.push(TaskInstance {
                    name,
                    definition,
                    kwargs: BTreeMap::new(),
                });
                continue;
            }

            for (index, variant) in definition.parametrize.iter().enumerate() {
                instances.push(TaskInstance {
                    name: format!("{}[{}]", name, variant.resolved_id(index)),
                    definition,
                    kwargs: variant.kwargs.clone(),
                });
            }
        }

        instances
    }
}
