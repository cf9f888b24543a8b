//! Graph execution.
//!
//! Dispatches all ready independent nodes concurrently, joins their
//! outputs into downstream joining nodes in declared dependency order,
//! and reports failures naming the node with every completed result
//! preserved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use prospectus_common::{ProspectusError, Result};
use prospectus_llm::CapabilityInvoker;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::graph::TaskGraph;
use crate::node::{NodeMode, TaskNode};

/// A completed node's result. Written exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    pub node_id: String,
    pub output: String,
    pub duration_ms: u64,
}

/// Terminal failure of a graph run.
///
/// `skipped` lists nodes that never became eligible because of the
/// failure; they are distinguishable from completed nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFailure {
    pub node_id: String,
    pub error: String,
    pub skipped: Vec<String>,
}

/// Outcome of executing one task graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub graph_name: String,

    /// Completed node results, in declaration order.
    pub completed: Vec<NodeOutput>,

    /// Result of the terminal node, when it completed.
    pub terminal_output: Option<String>,

    pub failure: Option<NodeFailure>,

    pub duration_ms: u64,
}

impl GraphReport {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn output_of(&self, node_id: &str) -> Option<&str> {
        self.completed
            .iter()
            .find(|o| o.node_id == node_id)
            .map(|o| o.output.as_str())
    }
}

/// The input context of a joining node: its instruction followed by the
/// dependency outputs concatenated in declared order, each tagged with
/// the producing node id.
///
/// Byte-identical for a fixed result set regardless of the order the
/// dependencies completed in.
pub fn joining_input(node: &TaskNode, results: &HashMap<String, String>) -> String {
    let sections: Vec<String> = node
        .depends_on
        .iter()
        .filter_map(|dep| {
            results
                .get(dep)
                .map(|output| format!("--- Output from {dep} ---\n{output}"))
        })
        .collect();

    format!("{}\n\n{}", node.instruction, sections.join("\n\n"))
}

/// Executes task graphs against a Capability Invoker.
pub struct GraphExecutor {
    invoker: Arc<dyn CapabilityInvoker>,
}

impl GraphExecutor {
    pub fn new(invoker: Arc<dyn CapabilityInvoker>) -> Self {
        Self { invoker }
    }

    /// Run the graph to completion or first failure.
    ///
    /// Only a structurally empty graph is an `Err`; node failures are
    /// reported inside the returned [`GraphReport`].
    pub async fn run(&self, graph: &TaskGraph) -> Result<GraphReport> {
        if graph.is_empty() {
            return Err(ProspectusError::Graph(format!(
                "Graph '{}' has no nodes",
                graph.name()
            )));
        }

        let start = Instant::now();

        info!(
            graph = %graph.name(),
            node_count = graph.len(),
            "Executing task graph"
        );

        let mut results: HashMap<String, String> = HashMap::new();
        let mut durations: HashMap<String, u64> = HashMap::new();
        let mut failed: Option<(String, String)> = None;

        while results.len() < graph.len() && failed.is_none() {
            let ready: Vec<&TaskNode> = graph
                .nodes()
                .iter()
                .filter(|n| !results.contains_key(&n.id))
                .filter(|n| n.depends_on.iter().all(|d| results.contains_key(d)))
                .collect();

            if ready.is_empty() {
                // Unreachable on a graph validated at construction.
                return Err(ProspectusError::Graph(format!(
                    "Graph '{}' stalled with {} of {} nodes complete",
                    graph.name(),
                    results.len(),
                    graph.len()
                )));
            }

            let independent: Vec<&TaskNode> = ready
                .iter()
                .copied()
                .filter(|n| n.mode == NodeMode::Independent)
                .collect();

            if !independent.is_empty() {
                // Fan out every ready independent node; each dispatch is
                // isolated and a failure does not cancel its siblings.
                let mut handles = Vec::with_capacity(independent.len());
                for node in independent {
                    debug!(graph = %graph.name(), node = %node.id, "Dispatching node");
                    let invoker = Arc::clone(&self.invoker);
                    let node = node.clone();
                    handles.push(tokio::spawn(async move {
                        let step = Instant::now();
                        let outcome = invoker.invoke(&node.instruction, &node.capabilities).await;
                        (node.id, outcome, step.elapsed().as_millis() as u64)
                    }));
                }

                for handle in handles {
                    match handle.await {
                        Ok((id, Ok(output), ms)) => {
                            debug!(graph = %graph.name(), node = %id, duration_ms = ms, "Node completed");
                            results.insert(id.clone(), output);
                            durations.insert(id, ms);
                        }
                        Ok((id, Err(e), _)) => {
                            error!(graph = %graph.name(), node = %id, error = %e, "Node failed");
                            if failed.is_none() {
                                failed = Some((id, e.to_string()));
                            }
                        }
                        Err(e) => {
                            error!(graph = %graph.name(), error = %e, "Node task join error");
                            if failed.is_none() {
                                failed = Some(("<join>".to_string(), e.to_string()));
                            }
                        }
                    }
                }
            } else {
                // Only joining nodes are ready; run the first declared.
                let node = ready[0];
                let input = joining_input(node, &results);

                debug!(
                    graph = %graph.name(),
                    node = %node.id,
                    dependency_count = node.depends_on.len(),
                    "Dispatching joining node"
                );

                let step = Instant::now();
                match self.invoker.invoke(&input, &node.capabilities).await {
                    Ok(output) => {
                        let ms = step.elapsed().as_millis() as u64;
                        debug!(graph = %graph.name(), node = %node.id, duration_ms = ms, "Node completed");
                        results.insert(node.id.clone(), output);
                        durations.insert(node.id.clone(), ms);
                    }
                    Err(e) => {
                        error!(graph = %graph.name(), node = %node.id, error = %e, "Node failed");
                        failed = Some((node.id.clone(), e.to_string()));
                    }
                }
            }
        }

        let completed: Vec<NodeOutput> = graph
            .nodes()
            .iter()
            .filter_map(|n| {
                results.get(&n.id).map(|output| NodeOutput {
                    node_id: n.id.clone(),
                    output: output.clone(),
                    duration_ms: durations.get(&n.id).copied().unwrap_or(0),
                })
            })
            .collect();

        let failure = failed.map(|(node_id, error)| {
            let skipped: Vec<String> = graph
                .nodes()
                .iter()
                .filter(|n| !results.contains_key(&n.id) && n.id != node_id)
                .map(|n| n.id.clone())
                .collect();
            NodeFailure {
                node_id,
                error,
                skipped,
            }
        });

        let terminal_output = graph
            .terminal()
            .and_then(|t| results.get(&t.id))
            .cloned();

        info!(
            graph = %graph.name(),
            completed = completed.len(),
            success = failure.is_none(),
            duration_ms = start.elapsed().as_millis(),
            "Graph execution finished"
        );

        Ok(GraphReport {
            graph_name: graph.name().to_string(),
            completed,
            terminal_output,
            failure,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
