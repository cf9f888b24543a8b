//! Task graph construction.

use std::collections::HashSet;

use prospectus_common::{ProspectusError, Result};
use serde::{Deserialize, Serialize};

use crate::node::TaskNode;

/// A directed acyclic graph of task nodes for one stage.
///
/// Dependencies may only reference nodes added earlier, which makes
/// cycles unrepresentable. The terminal node is the last one added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGraph {
    name: String,
    nodes: Vec<TaskNode>,
}

impl TaskGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Append a node, validating id uniqueness and that every
    /// dependency names an already-added node.
    pub fn add_node(mut self, node: TaskNode) -> Result<Self> {
        let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();

        if known.contains(node.id.as_str()) {
            return Err(ProspectusError::Graph(format!(
                "Duplicate node id '{}' in graph '{}'",
                node.id, self.name
            )));
        }
        for dep in &node.depends_on {
            if !known.contains(dep.as_str()) {
                return Err(ProspectusError::Graph(format!(
                    "Node '{}' depends on unknown node '{}' in graph '{}'",
                    node.id, dep, self.name
                )));
            }
        }

        self.nodes.push(node);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The node whose result is the graph's output.
    pub fn terminal(&self) -> Option<&TaskNode> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospectus_common::ProspectusError;

    #[test]
    fn test_terminal_is_last_added() {
        let graph = TaskGraph::new("research")
            .add_node(TaskNode::independent("finance", "a"))
            .unwrap()
            .add_node(TaskNode::independent("policy", "b"))
            .unwrap()
            .add_node(TaskNode::joining(
                "synthesis",
                "c",
                vec!["finance".into(), "policy".into()],
            ))
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.terminal().unwrap().id, "synthesis");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = TaskGraph::new("g")
            .add_node(TaskNode::independent("a", "x"))
            .unwrap()
            .add_node(TaskNode::independent("a", "y"))
            .unwrap_err();

        assert!(matches!(err, ProspectusError::Graph(_)));
        assert!(err.to_string().contains("Duplicate node id 'a'"));
    }

    #[test]
    fn test_forward_dependency_rejected() {
        let err = TaskGraph::new("g")
            .add_node(TaskNode::joining("join", "x", vec!["later".into()]))
            .unwrap_err();

        assert!(matches!(err, ProspectusError::Graph(_)));
        assert!(err.to_string().contains("unknown node 'later'"));
    }
}
