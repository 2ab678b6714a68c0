//! Default implementations of the host interfaces

pub mod default_node_collector;

pub use default_node_collector::DefaultNodeCollector;
