//! Configuration merging for stata-runner
//!
//! Layers are applied in order: built-in defaults -> config file -> command line. A later layer
//! overrides a key only when it sets it to a non-null value.

use super::{ConfigMap, default_config_map};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConfigMerger {
    layers: Vec<(String, ConfigMap)>,
}

impl ConfigMerger {
    /// Start from the built-in defaults
    pub fn new() -> Self {
        Self {
            layers: vec![("defaults".to_string(), default_config_map())],
        }
    }

    /// Add a layer that takes precedence over all previous ones
    pub fn push_layer(&mut self, source: impl Into<String>, layer: ConfigMap) -> &mut Self {
        self.layers.push((source.into(), layer));
        self
    }

    pub fn sources(&self) -> Vec<&str> {
        self.layers.iter().map(|(source, _)| source.as_str()).collect()
    }

    /// Get the merged configuration
    pub fn get_merged_config(&self) -> ConfigMap {
        let mut merged = ConfigMap::new();

        for (source, layer) in &self.layers {
            for (key, value) in layer {
                if value.is_null() && merged.contains_key(key) {
                    continue;
                }
                debug!("Config key '{}' set by {}", key, source);
                merged.insert(key.clone(), value.clone());
            }
        }

        merged
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a layer from `(key, value)` pairs, skipping `None`s
pub fn layer_from_pairs<I>(pairs: I) -> ConfigMap
where
    I: IntoIterator<Item = (&'static str, Option<Value>)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect()
}
