use std::fmt;
use std::path::{Path, PathBuf};

/// Value stored in a node and returned by [`Node::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Null,
    Text(String),
    Path(PathBuf),
    List(Vec<String>),
}

/// A dependency that lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub name: String,
    pub path: PathBuf,
}

/// A dependency that is a plain value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    pub name: String,
    pub value: NodeValue,
}

/// Handle on a task dependency, as handed out by a node collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Path(PathNode),
    Value(ValueNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Path(node) => &node.name,
            Node::Value(node) => &node.name,
        }
    }

    /// Location on disk, only for path nodes
    pub fn path(&self) -> Option<&Path> {
        match self {
            Node::Path(node) => Some(node.path.as_path()),
            Node::Value(_) => None,
        }
    }

    pub fn load(&self) -> NodeValue {
        match self {
            Node::Path(node) => NodeValue::Path(node.path.clone()),
            Node::Value(node) => node.value.clone(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Path(node) => write!(f, "PathNode(name={}, path={})", node.name, node.path.display()),
            Node::Value(node) => write!(f, "ValueNode(name={}, value={:?})", node.name, node.value),
        }
    }
}

/// Everything a node collector gets to know about a declared dependency
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub arg_name: String,
    pub value: NodeValue,
    pub task_path: Option<PathBuf>,
    pub task_name: String,
}

impl NodeInfo {
    pub fn new(
        arg_name: impl Into<String>,
        value: NodeValue,
        task_path: Option<&Path>,
        task_name: &str,
    ) -> Self {
        Self {
            arg_name: arg_name.into(),
            value,
            task_path: task_path.map(Path::to_path_buf),
            task_name: task_name.to_string(),
        }
    }
}
