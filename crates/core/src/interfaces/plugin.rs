//! Plugin interface for stata-runner
//!
//! Defines the lifecycle hooks a plugin implements and the metadata it reports.

use super::NodeCollector;
use crate::{
    config::ConfigMap,
    error::Result,
    marks::{Mark, MarkStore},
    types::Task,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata about a plugin
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    /// Plugin name
    pub name: String,

    /// Plugin version
    pub version: String,

    /// Plugin description
    pub description: Option<String>,

    /// Marks the plugin understands, with a one-line description each
    pub markers: Vec<(String, String)>,
}

/// What the host hands to `collect_task`
pub struct CollectContext<'a> {
    pub config: &'a ConfigMap,
    pub nodes: &'a dyn NodeCollector,
}

/// Main plugin interface.
///
/// Every hook has a no-op default so a plugin only implements the lifecycle points it cares
/// about. Hooks run in registration order; `collect_task` stops at the first plugin that
/// returns a task.
pub trait HostPlugin: Send + Sync {
    /// Get plugin metadata
    fn metadata(&self) -> PluginMetadata;

    /// Validate and complete the configuration before anything is collected
    fn parse_config(&self, _config: &mut ConfigMap) -> Result<()> {
        Ok(())
    }

    /// Turn keyword arguments of a parametrize variant into marks
    fn parametrize_kwarg_to_marker(
        &self,
        _kwargs: &mut BTreeMap<String, Value>,
        _marks: &mut Vec<Mark>,
    ) -> Result<()> {
        Ok(())
    }

    /// Build a task from a definition, or return `None` to let another plugin try
    fn collect_task(
        &self,
        _context: &CollectContext<'_>,
        _path: &Path,
        _name: &str,
        _marks: &mut MarkStore,
    ) -> Result<Option<Task>> {
        Ok(None)
    }

    /// Called before the task function runs
    fn execute_task_setup(&self, _config: &ConfigMap, _task: &Task) -> Result<()> {
        Ok(())
    }

    /// Called after the task function returned successfully
    fn execute_task_teardown(&self, _config: &ConfigMap, _task: &Task) -> Result<()> {
        Ok(())
    }
}
