use crate::{
    error::Result,
    types::{Node, NodeInfo},
};
use std::path::Path;

/// Trait for turning declared dependency values into nodes
pub trait NodeCollector: Send + Sync {
    /// Collect a node; relative paths are resolved against `root`
    fn collect_node(&self, root: &Path, info: NodeInfo) -> Result<Node>;
}
