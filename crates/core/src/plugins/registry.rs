//! Plugin registry
//!
//! Holds the plugins of a session in registration order and fans every lifecycle hook out to
//! them.

use super::StataPlugin;
use crate::{
    config::ConfigMap,
    error::Result,
    interfaces::{CollectContext, HostPlugin},
    marks::{Mark, MarkStore},
    types::Task,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Registry for host plugins
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn HostPlugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in plugins
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StataPlugin::new()));
        registry
    }

    /// Register a plugin; it runs after all plugins registered before it
    pub fn register(&mut self, plugin: Arc<dyn HostPlugin>) {
        self.plugins.push(plugin);
    }

    /// Get all registered plugin names
    pub fn names(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|plugin| plugin.metadata().name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn parse_config(&self, config: &mut ConfigMap) -> Result<()> {
        for plugin in &self.plugins {
            plugin.parse_config(config)?;
        }
        Ok(())
    }

    pub fn parametrize_kwarg_to_marker(
        &self,
        kwargs: &mut BTreeMap<String, Value>,
        marks: &mut Vec<Mark>,
    ) -> Result<()> {
        for plugin in &self.plugins {
            plugin.parametrize_kwarg_to_marker(kwargs, marks)?;
        }
        Ok(())
    }

    /// Ask each plugin in turn; the first task returned wins
    pub fn collect_task(
        &self,
        context: &CollectContext<'_>,
        path: &Path,
        name: &str,
        marks: &mut MarkStore,
    ) -> Result<Option<Task>> {
        for plugin in &self.plugins {
            if let Some(task) = plugin.collect_task(context, path, name, marks)? {
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    pub fn execute_task_setup(&self, config: &ConfigMap, task: &Task) -> Result<()> {
        for plugin in &self.plugins {
            plugin.execute_task_setup(config, task)?;
        }
        Ok(())
    }

    pub fn execute_task_teardown(&self, config: &ConfigMap, task: &Task) -> Result<()> {
        for plugin in &self.plugins {
            plugin.execute_task_teardown(config, task)?;
        }
        Ok(())
    }
}
