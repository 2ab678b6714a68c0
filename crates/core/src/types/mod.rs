pub mod node;
pub mod task;

pub use node::{Node, NodeInfo, NodeValue, PathNode, ValueNode};
pub use task::{Task, task_id};
