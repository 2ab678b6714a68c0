use crate::{
    error::Result,
    interfaces::NodeCollector,
    types::{Node, NodeInfo, NodeValue, PathNode, ValueNode},
};
use std::path::Path;

/// Node collector that makes path values into path nodes and keeps everything else as a value
#[derive(Debug, Clone, Default)]
pub struct DefaultNodeCollector;

impl DefaultNodeCollector {
    pub fn new() -> Self {
        Self
    }
}

impl NodeCollector for DefaultNodeCollector {
    fn collect_node(&self, root: &Path, info: NodeInfo) -> Result<Node> {
        let node = match info.value {
            NodeValue::Path(path) => {
                let path = if path.is_absolute() {
                    path
                } else {
                    root.join(path)
                };
                Node::Path(PathNode {
                    name: info.arg_name,
                    path,
                })
            }
            value => Node::Value(ValueNode {
                name: info.arg_name,
                value,
            }),
        };
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_relative_path_is_resolved_against_root() {
        let collector = DefaultNodeCollector::new();
        let info = NodeInfo::new(
            "_script",
            NodeValue::Path(PathBuf::from("script.do")),
            Some(Path::new("/project/task_example.json")),
            "task_example",
        );

        let node = collector.collect_node(Path::new("/project"), info).unwrap();

        assert_eq!(node.path(), Some(Path::new("/project/script.do")));
        assert_eq!(node.name(), "_script");
    }

    #[test]
    fn test_values_stay_values() {
        let collector = DefaultNodeCollector::new();
        let info = NodeInfo::new(
            "_options",
            NodeValue::List(vec!["a".to_string()]),
            None,
            "task_example",
        );

        let node = collector.collect_node(Path::new("/project"), info).unwrap();

        assert_eq!(node.path(), None);
        assert_eq!(node.load(), NodeValue::List(vec!["a".to_string()]));
    }
}
