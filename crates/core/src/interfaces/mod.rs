//! Core interfaces between the host and its plugins
//!
//! The host owns configuration, collection and the task lifecycle; plugins hook into it
//! through these traits.

pub mod node_collector;
pub mod plugin;
pub mod task_function;

pub use node_collector::NodeCollector;
pub use plugin::{CollectContext, HostPlugin, PluginMetadata};
pub use task_function::TaskFunction;
