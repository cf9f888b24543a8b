//! Task node types.

use prospectus_common::Capability;
use serde::{Deserialize, Serialize};

/// Scheduling mode of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    /// May run concurrently with siblings at the same dependency level.
    Independent,
    /// Waits for ALL listed dependencies, then aggregates their outputs
    /// into its input context.
    Joining,
}

/// One schedulable unit of work in a run's task graph.
///
/// Immutable once added to a graph; results live in the executor's run
/// state and are written exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique within a run
    pub id: String,

    /// Resolved instruction text, already expanded from a template
    pub instruction: String,

    /// Human-readable contract for the required output shape
    pub expected_output: String,

    /// Capability identifiers this node may use
    #[serde(default)]
    pub capabilities: Vec<Capability>,

    /// Node ids whose outputs must exist before this node runs
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Scheduling mode
    pub mode: NodeMode,
}

impl TaskNode {
    /// An immediately-eligible node with no dependencies.
    pub fn independent(id: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instruction: instruction.into(),
            expected_output: String::new(),
            capabilities: Vec::new(),
            depends_on: Vec::new(),
            mode: NodeMode::Independent,
        }
    }

    /// A node that joins the outputs of `depends_on` before running.
    pub fn joining(
        id: impl Into<String>,
        instruction: impl Into<String>,
        depends_on: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            instruction: instruction.into(),
            expected_output: String::new(),
            capabilities: Vec::new(),
            depends_on,
            mode: NodeMode::Joining,
        }
    }

    pub fn with_expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = expected.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_node_defaults() {
        let node = TaskNode::independent("finance", "Collect financials");

        assert_eq!(node.id, "finance");
        assert_eq!(node.mode, NodeMode::Independent);
        assert!(node.depends_on.is_empty());
        assert!(node.capabilities.is_empty());
    }

    #[test]
    fn test_joining_node_keeps_declared_order() {
        let node = TaskNode::joining(
            "synthesis",
            "Merge findings",
            vec!["finance".into(), "policy".into(), "industry".into()],
        );

        assert_eq!(node.mode, NodeMode::Joining);
        assert_eq!(node.depends_on, vec!["finance", "policy", "industry"]);
    }

    #[test]
    fn test_builder_methods() {
        let node = TaskNode::independent("finance", "Collect financials")
            .with_expected_output("A list of financial metrics")
            .with_capabilities(vec![Capability::FinancialDataLookup, Capability::WebSearch]);

        assert_eq!(node.expected_output, "A list of financial metrics");
        assert_eq!(node.capabilities.len(), 2);
    }
}
